/// Returns the bundled usage page with the invoking slash command
/// substituted for every `{command}` placeholder.
pub fn format_help(command: &str) -> String {
    include_str!("../help.md").replace("{command}", command)
}
