use anyhow::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

const PREFIXES: [&str; 5] = ["", "Ki", "Mi", "Gi", "Ti"];

/// Divides by 1024 until the value drops below 1024 or the prefixes run out.
fn scale(bytes: u64) -> (f64, &'static str) {
    let mut size = bytes as f64;
    let mut n = 0;
    while size >= 1024.0 && n < PREFIXES.len() - 1 {
        size /= 1024.0;
        n += 1;
    }
    (size, PREFIXES[n])
}

/// Formats a byte count with binary prefixes (e.g., "512B", "1.5KiB", "4.0MiB")
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let (size, prefix) = scale(bytes);
    // Debug formatting keeps a trailing ".0" on whole values.
    format!("{:?}{}B", size, prefix)
}

/// Like [`format_bytes`] but with a fixed number of decimals, for table columns.
pub fn format_bytes_fixed(bytes: u64, decimals: usize) -> String {
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let (size, prefix) = scale(bytes);
    format!("{:.*}{}B", decimals, size, prefix)
}

/// Appends timestamped lines to the run log.
pub struct Logger {
    file_path: String,
}

impl Logger {
    pub fn new(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
        }
    }

    pub fn log(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }
}
