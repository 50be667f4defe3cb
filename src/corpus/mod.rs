#[cfg(test)]
mod tests;

use csv::Reader;
use std::path::Path;
use tracing::{debug, info};

use crate::{GuideError, Result};

enum CorpusLayout {
    TitleBody { title: usize, body: usize },
    Text { text: usize },
}

impl CorpusLayout {
    fn detect(headers: &csv::StringRecord) -> Option<Self> {
        let position =
            |name: &str| headers.iter().position(|header| header.trim() == name);

        if let (Some(title), Some(body)) = (position("title"), position("body")) {
            return Some(Self::TitleBody { title, body });
        }

        position("text").map(|text| Self::Text { text })
    }

    fn passage(&self, record: &csv::StringRecord) -> Option<String> {
        match *self {
            Self::TitleBody { title, body } => {
                let title = record.get(title).unwrap_or("").trim();
                let body = record.get(body).unwrap_or("").trim();

                match (title.is_empty(), body.is_empty()) {
                    (true, true) => None,
                    (false, true) => Some(title.to_string()),
                    (true, false) => Some(body.to_string()),
                    (false, false) => Some(format!("{title}：{body}")),
                }
            }
            Self::Text { text } => {
                let text = record.get(text).unwrap_or("").trim();
                (!text.is_empty()).then(|| text.to_string())
            }
        }
    }
}

/// Load guide passages from a CSV file.
///
/// Two layouts are accepted: `title,body` columns joined into one passage
/// per row, or a single `text` column.
#[inline]
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut reader = Reader::from_path(path).map_err(|e| {
        GuideError::Schema(format!("Failed to open corpus {}: {}", path.display(), e))
    })?;

    let headers = reader
        .headers()
        .map_err(|e| GuideError::Schema(format!("Failed to read corpus headers: {e}")))?
        .clone();

    let layout = CorpusLayout::detect(&headers).ok_or_else(|| {
        GuideError::Schema(format!(
            "Unrecognized corpus columns {:?}; expected title,body or text",
            headers.iter().collect::<Vec<_>>()
        ))
    })?;

    let mut texts = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            GuideError::Schema(format!("Failed to read corpus row {}: {}", row + 2, e))
        })?;

        if let Some(text) = layout.passage(&record) {
            texts.push(text);
        } else {
            debug!("Skipping empty corpus row {}", row + 2);
        }
    }

    if texts.is_empty() {
        return Err(GuideError::Schema(format!(
            "Corpus {} contains no usable rows",
            path.display()
        )));
    }

    info!("Loaded {} passages from {}", texts.len(), path.display());
    Ok(texts)
}
