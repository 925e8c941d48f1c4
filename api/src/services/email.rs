//! Email delivery for account verification and password resets.
//!
//! Uses the `lettre` crate over Gmail SMTP. Configuration comes from the
//! application config (`SMTP_USERNAME`, `SMTP_APP_PASSWORD`, `FRONTEND_URL`,
//! `EMAIL_FROM_NAME`); when no SMTP credentials are configured the service
//! logs the action link instead of sending, so development and test runs
//! need no mail account.

use lettre::{
    AsyncTransport, Tokio1Executor,
    message::{Message, MultiPart, SinglePart, header},
    transport::smtp::{AsyncSmtpTransport, authentication::Credentials},
};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use once_cell::sync::Lazy;

type EmailError = Box<dyn std::error::Error + Send + Sync>;

/// Global SMTP client, initialized lazily on first real send.
static SMTP_CLIENT: Lazy<AsyncSmtpTransport<Tokio1Executor>> = Lazy::new(|| {
    let username = common::config::smtp_username();
    let password = common::config::smtp_app_password();

    let tls_parameters =
        TlsParameters::new("smtp.gmail.com".to_string()).expect("Failed to create TLS parameters");

    AsyncSmtpTransport::<Tokio1Executor>::relay("smtp.gmail.com")
        .expect("Failed to create SMTP transport")
        .port(587)
        .tls(Tls::Required(tls_parameters))
        .credentials(Credentials::new(username, password))
        .build()
});

fn smtp_configured() -> bool {
    !common::config::smtp_username().is_empty() && !common::config::smtp_app_password().is_empty()
}

/// Service for handling email-related operations.
pub struct EmailService;

impl EmailService {
    /// Sends the email-verification link for a fresh registration.
    pub async fn send_verification_email(
        to_email: &str,
        full_name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let from_name = common::config::email_from_name();
        let verify_link = format!(
            "{}/verify-email?token={}",
            common::config::frontend_url(),
            token
        );

        if !smtp_configured() {
            tracing::info!(to = to_email, link = %verify_link, "SMTP not configured; verification link logged");
            return Ok(());
        }

        let email = Message::builder()
            .from(format!("{} <{}>", from_name, common::config::smtp_username()).parse()?)
            .to(to_email.parse()?)
            .subject("Verify Your Email Address")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(format!(
                                "Hello {},\n\n\
                                Welcome! Please confirm your email address by opening the link below:\n\n\
                                {}\n\n\
                                The link expires in 24 hours. If you did not create this account, you can ignore this email.\n\n\
                                Best regards,\n\
                                {}",
                                full_name, verify_link, from_name
                            )),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<!DOCTYPE html>
                                <html>
                                <head>
                                    <style>
                                        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
                                        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; text-align: center; }}
                                        .button {{
                                            display: inline-block;
                                            padding: 10px 20px;
                                            background-color: #16a34a;
                                            color: #ffffff !important;
                                            text-decoration: none;
                                            border-radius: 5px;
                                            margin: 20px 0;
                                            font-weight: bold;
                                        }}
                                    </style>
                                </head>
                                <body>
                                    <div class="container">
                                        <h2>Verify Your Email Address</h2>
                                        <p>Hello {},</p>
                                        <p>Welcome! Please confirm your email address to activate your account:</p>
                                        <a href="{}" class="button">Verify Email</a>
                                        <p>The link expires in 24 hours.</p>
                                        <p>If you did not create this account, you can ignore this email.</p>
                                        <p>Best regards,<br>{}</p>
                                    </div>
                                </body>
                                </html>"#,
                                full_name, verify_link, from_name
                            )),
                    ),
            )?;

        SMTP_CLIENT.send(email).await?;
        Ok(())
    }

    /// Sends a password reset email to the specified email address.
    pub async fn send_password_reset_email(
        to_email: &str,
        reset_token: &str,
    ) -> Result<(), EmailError> {
        let from_name = common::config::email_from_name();
        let expiry_minutes = common::config::reset_token_expiry_minutes();
        let reset_link = format!(
            "{}/reset-password?token={}",
            common::config::frontend_url(),
            reset_token
        );

        if !smtp_configured() {
            tracing::info!(to = to_email, link = %reset_link, "SMTP not configured; reset link logged");
            return Ok(());
        }

        let email = Message::builder()
            .from(format!("{} <{}>", from_name, common::config::smtp_username()).parse()?)
            .to(to_email.parse()?)
            .subject("Reset Your Password")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(format!(
                                "Hello,\n\n\
                                You have requested to reset your password. Click the link below to proceed:\n\n\
                                {}\n\n\
                                This link will expire in {} minutes.\n\n\
                                If you did not request this password reset, please ignore this email.\n\n\
                                Best regards,\n\
                                {}",
                                reset_link, expiry_minutes, from_name
                            )),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<!DOCTYPE html>
                                <html>
                                <head>
                                    <style>
                                        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
                                        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; text-align: center; }}
                                        .button {{
                                            display: inline-block;
                                            padding: 10px 20px;
                                            background-color: #007bff;
                                            color: #ffffff !important;
                                            text-decoration: none;
                                            border-radius: 5px;
                                            margin: 20px 0;
                                            font-weight: bold;
                                        }}
                                        .warning {{ color: #dc3545; }}
                                    </style>
                                </head>
                                <body>
                                    <div class="container">
                                        <h2>Reset Your Password</h2>
                                        <p>Hello,</p>
                                        <p>You have requested to reset your password. Click the button below to proceed:</p>
                                        <a href="{}" class="button">Reset Password</a>
                                        <p>This link will expire in {} minutes.</p>
                                        <p class="warning">If you did not request this password reset, please ignore this email.</p>
                                        <p>Best regards,<br>{}</p>
                                    </div>
                                </body>
                                </html>"#,
                                reset_link, expiry_minutes, from_name
                            )),
                    ),
            )?;

        SMTP_CLIENT.send(email).await?;
        Ok(())
    }
}
