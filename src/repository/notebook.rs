// file: src/repository/notebook.rs
// description: jupyter notebook to python script conversion ahead of summarization
// reference: https://nbformat.readthedocs.io/en/latest/format_description.html

use crate::error::{PipelineError, Result};
use serde_json::Value;
use std::path::Path;

const SCRIPT_HEADER: &str = "#!/usr/bin/env python\n# coding: utf-8\n";

pub fn is_notebook(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "ipynb")
}

/// Renders a notebook as a Python script. Code cells are kept as code under an
/// `# In[n]:` marker, markdown cells become comments, outputs and metadata are dropped.
pub fn notebook_to_script(content: &[u8]) -> Result<String> {
    let notebook: Value = serde_json::from_slice(content).map_err(PipelineError::serialization)?;

    // nbformat 4 keeps cells at the top level, nbformat 3 inside the first worksheet.
    let cells = notebook
        .get("cells")
        .or_else(|| notebook.pointer("/worksheets/0/cells"))
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::Serialization("notebook has no cells".to_string()))?;

    let mut script = String::from(SCRIPT_HEADER);
    let mut execution = 0;
    for cell in cells {
        let source = cell_source(cell);
        if source.trim().is_empty() {
            continue;
        }

        match cell.get("cell_type").and_then(Value::as_str) {
            Some("code") => {
                execution += 1;
                script.push_str(&format!("\n\n# In[{}]:\n\n\n", execution));
                script.push_str(source.trim_end());
                script.push('\n');
            }
            Some("markdown") => {
                script.push('\n');
                for line in source.trim_end().lines() {
                    if line.is_empty() {
                        script.push_str("#\n");
                    } else {
                        script.push_str("# ");
                        script.push_str(line);
                        script.push('\n');
                    }
                }
            }
            _ => {}
        }
    }

    Ok(script)
}

/// Cell text is either a single string or a list of lines.
fn cell_source(cell: &Value) -> String {
    match cell.get("source").or_else(|| cell.get("input")) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(lines)) => lines.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}
