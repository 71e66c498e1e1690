#![allow(dead_code)]

pub mod fakes;
pub mod http_server;
