use crate::cli::run;

pub mod adapter;
pub mod auth;
pub mod cli;
mod config;
pub mod domain;
pub mod http;
pub mod library;
pub mod remote;
pub mod session;

fn main() {
    if let Err(e) = run() {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
