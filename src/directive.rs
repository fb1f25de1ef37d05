//! Splits a template file into its declaration block, eval script and
//! literal body.
//!
//! A file starts in header mode: leading `#` lines collect variable
//! declarations and leading `!` lines collect the eval script. The first
//! blank or ordinary line ends the header for good; `##` and `!!` escape
//! a literal `#`/`!` at the start of a body line.

/// The three blocks of one classified template file.
#[derive(Debug, Default, PartialEq)]
pub struct FileBlocks {
    /// Declaration entries joined with `|`, each already trimmed.
    pub declarations: String,
    /// The `!`-prefixed lines, line breaks preserved.
    pub eval_script: String,
    /// Literal body text with escape prefixes stripped.
    pub body: String,
}

/// Classifies the raw text of one template file, line by line.
///
/// The body keeps the exact line-break count of the source and never gains
/// a trailing break the source did not have.
pub fn classify(text: &str) -> FileBlocks {
    let mut blocks = FileBlocks::default();
    let mut collect_declarations = true;
    let mut collect_eval = true;

    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;

    for (index, line) in lines.iter().enumerate() {
        let break_follows = index != last;
        let mut push_body = |text: &str| {
            blocks.body.push_str(text);
            if break_follows {
                blocks.body.push('\n');
            }
        };

        if line.trim().is_empty() {
            collect_declarations = false;
            collect_eval = false;
            push_body(line);
        } else if let Some(escaped) = line.strip_prefix("##") {
            collect_declarations = false;
            collect_eval = false;
            push_body(&format!("#{}", escaped));
        } else if line.starts_with("!!") {
            collect_declarations = false;
            collect_eval = false;
            push_body(&line[1..]);
        } else if line.starts_with('#') && collect_declarations {
            let entry = line[1..].trim();
            if !blocks.declarations.is_empty() {
                blocks.declarations.push('|');
            }
            blocks.declarations.push_str(entry);
        } else if line.starts_with('!') && collect_eval {
            // An eval line ends declaration collection for the rest of
            // the file.
            collect_declarations = false;
            blocks.eval_script.push_str(&line[1..]);
            blocks.eval_script.push('\n');
        } else {
            collect_declarations = false;
            collect_eval = false;
            push_body(line);
        }
    }

    blocks
}
