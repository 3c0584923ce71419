use std::env;

use crate::models::{CLIConfig, Command};

const DEFAULT_URL: &str = "http://localhost:8080";

pub fn parse_config() -> Result<CLIConfig, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args(&args, env_or("RESEARCH_WORKER_URL", DEFAULT_URL.to_string()))
}

pub fn parse_args(args: &[String], base_url: String) -> Result<CLIConfig, String> {
    let mut base_url = base_url;
    let mut id = None;
    let mut depth = 1;
    let mut rest = Vec::new();

    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                base_url = value_after(args, idx, "--base")?;
                idx += 1;
            }
            "--id" => {
                id = Some(value_after(args, idx, "--id")?);
                idx += 1;
            }
            "--depth" => {
                let raw = value_after(args, idx, "--depth")?;
                depth = raw.parse::<u32>().map_err(|_| format!("invalid depth: {}", raw))?;
                idx += 1;
            }
            "-h" | "--help" => {
                return Ok(CLIConfig {
                    base_url,
                    command: Command::Help,
                })
            }
            other => rest.push(other.to_string()),
        }
        idx += 1;
    }

    let command = match rest.first().map(String::as_str) {
        None => Command::Help,
        Some("get") => match rest.get(1) {
            Some(id) => Command::Get { id: id.clone() },
            None => return Err("get requires a promise id".to_string()),
        },
        Some("list") => {
            let limit = match rest.get(1) {
                Some(raw) => raw.parse::<usize>().map_err(|_| format!("invalid limit: {}", raw))?,
                None => 10,
            };
            Command::List { limit }
        }
        Some(_) => Command::Research {
            topic: rest.join(" "),
            depth,
            id,
        },
    };

    Ok(CLIConfig { base_url, command })
}

fn value_after(args: &[String], idx: usize, flag: &str) -> Result<String, String> {
    args.get(idx + 1)
        .cloned()
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn env_or(key: &str, fallback: String) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CLIConfig, String> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args(&args, DEFAULT_URL.to_string())
    }

    #[test]
    fn topic_words_are_joined() {
        let cfg = parse(&["--depth", "2", "ocean", "tides", "--id", "r1"]).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_URL);
        assert_eq!(
            cfg.command,
            Command::Research {
                topic: "ocean tides".to_string(),
                depth: 2,
                id: Some("r1".to_string()),
            }
        );
    }

    #[test]
    fn get_and_list_subcommands() {
        assert_eq!(parse(&["get", "r1"]).unwrap().command, Command::Get { id: "r1".to_string() });
        assert_eq!(parse(&["list"]).unwrap().command, Command::List { limit: 10 });
        assert_eq!(parse(&["list", "3"]).unwrap().command, Command::List { limit: 3 });
        assert!(parse(&["get"]).is_err());
        assert!(parse(&["list", "many"]).is_err());
    }

    #[test]
    fn flags_need_values() {
        assert!(parse(&["--base"]).is_err());
        assert!(parse(&["--depth", "deep", "x"]).is_err());
        let cfg = parse(&["--base", "http://worker:9000"]).unwrap();
        assert_eq!(cfg.base_url, "http://worker:9000");
        assert_eq!(cfg.command, Command::Help);
    }
}
