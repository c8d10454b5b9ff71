//! Native bindings exposed to Lox programs (`spec.md` §4.5/§6).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::function::NativeFunction;
use crate::value::Value;

/// `clock()` — seconds since the Unix epoch as a float, matching
/// `loxothon`'s `LoxClock` (`time.time()`). Plain `std::time` is used rather
/// than the teacher's `chrono` dependency: `chrono` exists in the teacher's
/// stack for Python's `datetime` object model, which Lox has no counterpart
/// for, so there is nothing left for it to do here beyond what
/// `SystemTime` already provides.
pub fn clock() -> NativeFunction {
    NativeFunction::new("clock", 0, |_interpreter, _args| {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Ok(Value::Number(elapsed.as_secs_f64()))
    })
}
