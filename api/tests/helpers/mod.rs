#![allow(dead_code)]

pub mod app;

pub use app::{
    create_parent, create_teacher, get_json_body, get_request, json_request, make_app,
    seed_student,
};
