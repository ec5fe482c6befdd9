use super::ExportBundle;

pub fn render(bundle: &ExportBundle) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(bundle)
}

pub fn parse(content: &str) -> Result<ExportBundle, serde_yaml::Error> {
    serde_yaml::from_str(content)
}
