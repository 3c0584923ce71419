use crate::models::PromiseInfo;

pub fn help() {
    println!("Usage:");
    println!("  research-invoke [--base URL] [--id ID] [--depth N] <topic...>");
    println!("  research-invoke get <id>");
    println!("  research-invoke list [limit]");
    println!();
    println!("The worker URL defaults to $RESEARCH_WORKER_URL or http://localhost:8080.");
}

pub fn promise(promise: &PromiseInfo) {
    println!("[{}] {} ({})", promise.state, promise.id, promise.func);
    if let Some(err) = &promise.error {
        println!("error: {}", err);
        return;
    }
    match promise.value.as_ref().and_then(|v| v.get("summary")).and_then(|v| v.as_str()) {
        Some(summary) => println!("{}", summary),
        None => {
            if let Some(value) = &promise.value {
                println!("{}", value);
            }
        }
    }
}

pub fn promises(items: &[PromiseInfo]) {
    if items.is_empty() {
        println!("no promises");
        return;
    }
    for item in items {
        println!("[{}] {} {} {}", item.state, item.created_at, item.id, item.func);
    }
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
