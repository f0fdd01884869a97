use crate::ir::{EntrySource, Summary};

pub fn summarize(summary: &Summary) -> String {
    let mut output = String::new();
    output.push_str(&format!("Package: {}\n", summary.package));
    output.push_str(&format!(
        "Entries: {} ({})\n",
        summary.entries,
        format_source(summary.source)
    ));
    output.push_str(&format!("Formatter: {}\n", summary.formatter));
    output.push_str(&format!(
        "Output: {} ({} bytes)\n",
        summary.output, summary.bytes_written
    ));
    if let Some(test_output) = summary.test_output.as_ref() {
        output.push_str(&format!("Race test: {test_output}\n"));
    }

    output.trim_end().to_string()
}

fn format_source(source: EntrySource) -> &'static str {
    match source {
        EntrySource::Explicit => "explicit",
        EntrySource::Catalog => "built-in catalog",
    }
}
