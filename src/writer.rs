//! Serialization of the event stream into indented Python text.

use std::collections::HashMap;

use crate::config::Config;
use crate::debug_println;
use crate::error::{ErrorKind, Result, TranspileError};
use crate::events::Event;

#[derive(Debug)]
struct OpenBlock {
    id: String,
    /// Value of the line counter when the block was opened
    opened_at: usize,
}

/// Writes events as text, tracking indentation by block id.
///
/// `Debug`, `Expr`, `LineAfter` and `Break` events that reach the writer were
/// not consumed by any visitor; they are written as comments so the output
/// shows where something went wrong.
pub struct EmissionWriter<'a> {
    config: &'a Config,
    output: String,
    blocks: Vec<OpenBlock>,
    last_line_at_depth: HashMap<usize, usize>,
    numline: usize,
}

impl<'a> EmissionWriter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            output: String::new(),
            blocks: Vec::new(),
            last_line_at_depth: HashMap::new(),
            numline: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    pub fn write_all<'e>(&mut self, events: impl IntoIterator<Item = &'e Event>) -> Result<()> {
        for event in events {
            self.write_event(event)?;
        }
        Ok(())
    }

    pub fn write_event(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Line(text) => self.line(text),
            Event::Begin(id) => {
                self.blocks.push(OpenBlock {
                    id: id.clone(),
                    opened_at: self.numline,
                });
                self.last_line_at_depth.insert(self.depth(), self.numline);
            }
            Event::End(id) => self.end(id)?,
            Event::Debug(text) => {
                if self.config.emit_debug_comments {
                    self.comment("# DEBUG:: ", text);
                }
            }
            Event::Expr(text) => self.comment("# EXPR??:: ", text),
            Event::LineAfter(text) => self.comment("# LINE+1??:: ", text),
            Event::Break(text) => self.comment("# BREAK??:: ", text),
        }
        Ok(())
    }

    /// Close the stream and return the text. Blocks still open are reported.
    pub fn finish(mut self) -> Result<String> {
        if let Some(open) = self.blocks.last() {
            if self.config.strict_blocks {
                return Err(TranspileError::new(
                    ErrorKind::BlockMismatch,
                    format!("block '{}' was never closed", open.id),
                ));
            }
        }
        while let Some(open) = self.blocks.pop() {
            debug_println!("unclosed block '{}'", open.id);
            self.write_raw(&format!("# END-ERROR!! unclosed block {}", open.id));
        }
        Ok(self.output)
    }

    fn line(&mut self, text: &str) {
        let depth = self.depth();
        if text.is_empty() {
            if !self.ends_with_blank() {
                self.output.push('\n');
            }
            return;
        }

        self.numline += 1;
        if let Some(&last) = self.last_line_at_depth.get(&depth) {
            if self.numline - last > self.config.blank_line_threshold && !self.ends_with_blank() {
                self.output.push('\n');
            }
        }
        self.write_raw(text);
        self.last_line_at_depth.insert(depth, self.numline);
    }

    fn end(&mut self, id: &str) -> Result<()> {
        let Some(open) = self.blocks.last() else {
            return self.mismatch(&format!("no open block for '{}'", id));
        };
        if open.opened_at == self.numline {
            self.line("pass");
        }

        let open = self.blocks.pop();
        match open {
            Some(open) if open.id == id => {}
            Some(open) => {
                self.mismatch(&format!("expected '{}', got '{}'", open.id, id))?;
            }
            None => {}
        }

        if id.starts_with("block-class-") || id.starts_with("block-def-") {
            self.line("");
        }
        Ok(())
    }

    fn mismatch(&mut self, message: &str) -> Result<()> {
        debug_println!("block mismatch: {}", message);
        if self.config.strict_blocks {
            return Err(TranspileError::new(ErrorKind::BlockMismatch, message)
                .with_help("set strict_blocks to false to keep going with a marker line"));
        }
        self.write_raw(&format!("# END-ERROR!! {}", message));
        Ok(())
    }

    /// Marker lines do not count as statements of the block
    fn comment(&mut self, prefix: &str, text: &str) {
        let text = text.replace('\n', "\\n");
        self.write_raw(&format!("{}{}", prefix, text));
    }

    fn write_raw(&mut self, text: &str) {
        for _ in 0..self.depth() {
            self.output.push_str(&self.config.indent_unit);
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn ends_with_blank(&self) -> bool {
        self.output.is_empty() || self.output.ends_with("\n\n")
    }
}
