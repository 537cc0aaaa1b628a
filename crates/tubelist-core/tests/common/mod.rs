#![allow(dead_code)]

pub mod watch_server;
