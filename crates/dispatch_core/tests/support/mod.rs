#![allow(dead_code)]

pub mod runtime;
