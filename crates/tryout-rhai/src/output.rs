// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! stdout/stderr capture for rhai `print`, `debug`, and `eprint`.

use std::cell::{Cell, RefCell};

use tryout_engine::CapturedOutput;

/// Buffers shared between the evaluator and the engine callbacks.
#[derive(Debug, Default)]
pub(crate) struct OutputBuffers {
    capturing: Cell<bool>,
    stdout: RefCell<String>,
    stderr: RefCell<String>,
}

impl OutputBuffers {
    pub fn begin(&self) {
        self.stdout.borrow_mut().clear();
        self.stderr.borrow_mut().clear();
        self.capturing.set(true);
    }

    pub fn finish(&self) -> CapturedOutput {
        self.capturing.set(false);
        CapturedOutput {
            stdout: std::mem::take(&mut *self.stdout.borrow_mut()),
            stderr: std::mem::take(&mut *self.stderr.borrow_mut()),
        }
    }

    pub fn write_stdout(&self, text: &str) {
        if self.capturing.get() {
            let mut out = self.stdout.borrow_mut();
            out.push_str(text);
            out.push('\n');
        } else {
            println!("{}", text);
        }
    }

    pub fn write_stderr(&self, text: &str) {
        if self.capturing.get() {
            let mut err = self.stderr.borrow_mut();
            err.push_str(text);
            err.push('\n');
        } else {
            eprintln!("{}", text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_between_begin_and_finish() {
        let buffers = OutputBuffers::default();
        buffers.begin();
        buffers.write_stdout("Hello, World!");
        buffers.write_stderr("careful");
        let captured = buffers.finish();
        assert_eq!(captured.stdout, "Hello, World!\n");
        assert_eq!(captured.stderr, "careful\n");

        buffers.begin();
        assert_eq!(buffers.finish(), CapturedOutput::default());
    }
}
