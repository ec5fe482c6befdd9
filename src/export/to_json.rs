use super::ExportBundle;

pub fn render(bundle: &ExportBundle) -> serde_json::Result<String> {
    serde_json::to_string_pretty(bundle)
}

pub fn parse(content: &str) -> serde_json::Result<ExportBundle> {
    serde_json::from_str(content)
}
