use tet::Session;

use crate::helpers::Intended;

pub fn run(s: &mut Session, intended: &mut Intended) {
    s.group("#assert", |s| {
        s.assert("truthy blocks pass", |_| true);
        s.assert("Some counts as truthy", |_| Some("value"));

        intended.should_fail(s, |s| s.assert("falsy blocks fail", |_| None::<()>));
        intended.should_err(s, |s| {
            s.assert("panics are caught and count as failures", |_| -> bool {
                panic!("not a method")
            })
        });
        intended.should_err(s, |s| {
            s.assert("Err counts as an error", |_| "1.5".parse::<u8>().map(|n| n > 0))
        });

        let passed = s.assert("passing returns true", |_| true);
        s.assert("... and it really is true", |_| passed);

        let failed = intended.should_fail(s, |s| s.assert("failing returns false", |_| false));
        s.assert("... and it really is false", |_| failed == Some(false));

        intended.should_fail(s, |s| s.assert(None::<&str>, |_| false));
    });

    s.group("#deny", |s| {
        s.deny("falsy blocks pass", |_| false);
        s.deny("None counts as falsy", |_| "".parse::<u8>().ok());
        intended.should_fail(s, |s| s.deny("truthy blocks fail", |_| true));
        intended.should_err(s, |s| {
            s.deny("Err is still an error", |_| "x".parse::<u8>().map(|n| n > 0))
        });
    });
}
