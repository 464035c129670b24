use std::collections::BTreeMap;

use comfy_table::Cell;

use crate::command::{Command, CommandType};

const TABLE_PRESET: &str = "||--+-++|    ++++++";

pub fn pretty_format_commands(commands: &[Command]) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table.load_preset(TABLE_PRESET);

    if commands.is_empty() {
        return table;
    }

    table.set_header(vec![
        Cell::new("#"),
        Cell::new("type"),
        Cell::new("key"),
        Cell::new("command"),
    ]);
    for (i, command) in commands.iter().enumerate() {
        let key = command
            .key()
            .map(|key| key.to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(i),
            Cell::new(command.command_type()),
            Cell::new(key),
            Cell::new(command),
        ]);
    }

    table
}

/// Number of commands per type, in tag order.
pub fn command_type_counts(commands: &[Command]) -> Vec<(CommandType, usize)> {
    let mut counts: BTreeMap<u8, (CommandType, usize)> = BTreeMap::new();
    for command in commands {
        let ty = command.command_type();
        counts.entry(ty as u8).or_insert((ty, 0)).1 += 1;
    }
    counts.into_values().collect()
}

pub fn pretty_format_summary(commands: &[Command]) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table.load_preset(TABLE_PRESET);
    table.set_header(vec![Cell::new("type"), Cell::new("count")]);
    for (ty, count) in command_type_counts(commands) {
        table.add_row(vec![Cell::new(ty), Cell::new(count)]);
    }
    table
}
