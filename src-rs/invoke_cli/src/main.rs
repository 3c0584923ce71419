mod cli;
mod client;
mod models;
mod render;

use std::process::ExitCode;

use client::HTTPClient;
use models::Command;

fn main() -> ExitCode {
    let config = match cli::parse_config() {
        Ok(config) => config,
        Err(err) => {
            render::error(&err);
            render::help();
            return ExitCode::from(2);
        }
    };

    let client = match HTTPClient::new(&config.base_url) {
        Ok(client) => client,
        Err(err) => {
            render::error(&err);
            return ExitCode::FAILURE;
        }
    };

    let result = match config.command {
        Command::Help => {
            render::help();
            Ok(())
        }
        Command::Research { topic, depth, id } => client.research(&topic, depth, id).map(|p| render::promise(&p)),
        Command::Get { id } => client.promise(&id).map(|p| render::promise(&p)),
        Command::List { limit } => client.list(limit).map(|items| render::promises(&items)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            render::error(&err);
            ExitCode::FAILURE
        }
    }
}
