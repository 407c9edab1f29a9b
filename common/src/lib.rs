#![forbid(unsafe_code)]
#![allow(clippy::too_many_arguments)]

pub mod cli;
pub mod conf;
pub mod game;
pub mod rpc;
pub mod util;
