//! Pluggable sink for `print` output (`spec.md` §4.5/§6).
//!
//! The teacher has no `log`/`tracing` dependency for its own `print`; it
//! defines a `PrintWriter` trait instead (`StdPrint`/`NoPrint`/
//! `CollectStringPrint`) so the VM's notion of standard output can be
//! swapped out under test or inside an embedder. `Printer` plays the same
//! role here, kept separate from `ErrorReporter` since program output and
//! diagnostics are different streams with different consumers.

use std::cell::RefCell;
use std::rc::Rc;

pub trait Printer {
    fn print(&self, line: &str);
}

/// Lets a test hold an `Rc<CollectingPrinter>` outside the `Interpreter`
/// (which owns its printer as `Box<dyn Printer>`) while still reading back
/// what was printed once the run is over.
impl<T: Printer + ?Sized> Printer for Rc<T> {
    fn print(&self, line: &str) {
        self.as_ref().print(line);
    }
}

/// The default: writes to the process's real stdout, one line per call
/// (`spec.md` §6: "Runtime output ... `print` emits `stringify(value) +
/// \"\\n\"`").
#[derive(Debug, Default)]
pub struct StdoutPrinter;

impl Printer for StdoutPrinter {
    fn print(&self, line: &str) {
        println!("{line}");
    }
}

/// Collects every printed line instead of writing it — used by `lox`'s own
/// tests and by embedders that want program output surfaced as data
/// (mirrors `ouros::io::CollectStringPrint`).
#[derive(Debug, Default)]
pub struct CollectingPrinter {
    pub lines: RefCell<Vec<String>>,
}

impl CollectingPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lines collected so far, newline-joined the way real stdout would
    /// have received them.
    pub fn output(&self) -> String {
        self.lines.borrow().iter().map(|line| format!("{line}\n")).collect()
    }
}

impl Printer for CollectingPrinter {
    fn print(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}
