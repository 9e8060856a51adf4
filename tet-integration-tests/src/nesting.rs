use std::cell::Cell;
use tet::Session;

use crate::helpers::Intended;

pub fn run(s: &mut Session, intended: &mut Intended) {
    s.group("nesting guard", |s| {
        let ran = Cell::new(false);
        intended.should_fail(s, |s| {
            s.assert("outer", |s| {
                s.assert("inner", |_| {
                    ran.set(true);
                    true
                });
                true
            })
        });
        s.assert("the nested body never ran", |_| !ran.get());

        intended.should_fail(s, |s| {
            s.err_any("outer", |s| {
                s.err_any("inner", |_| -> () { panic!("never raised") });
                "x".parse::<u8>()
            })
        });

        intended.should_err(s, |s| s.assert("boom", |_| -> bool { panic!("boom") }));
        s.assert("the guard is released after a panic", |_| true);
    });
}
