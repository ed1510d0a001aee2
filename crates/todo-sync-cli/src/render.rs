//! Plain-text rendering of the list and tracker state.

use todo_sync_core::{Item, OperationKind, TrackerState};

pub fn item_line(item: &Item) -> String {
    let mark = if item.completed { "x" } else { " " };
    format!("[{}] {}  {}", mark, item.id, item.title)
}

pub fn remaining_line(remaining: usize) -> String {
    match remaining {
        1 => "1 item left".to_string(),
        n => format!("{} items left", n),
    }
}

/// The list followed by the remaining count, newline-terminated.
pub fn render_list(items: &[Item]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        out.push_str("No todos yet\n");
    }
    for item in items {
        out.push_str(&item_line(item));
        out.push('\n');
    }
    let remaining = items.iter().filter(|item| !item.completed).count();
    out.push_str(&remaining_line(remaining));
    out.push('\n');
    out
}

/// One line describing in-flight work, or `None` once the tracker is idle.
pub fn progress_line(state: &TrackerState) -> Option<String> {
    if state.is_idle() {
        return None;
    }

    let mut parts = Vec::new();
    for kind in [OperationKind::Toggle, OperationKind::Delete] {
        let mut ids: Vec<&str> = state.ids(kind).iter().map(String::as_str).collect();
        if ids.is_empty() {
            continue;
        }
        ids.sort_unstable();
        parts.push(format!("{} pending: {}", kind, ids.join(", ")));
    }
    Some(parts.join("; "))
}
