use tet::Session;

use crate::helpers::Intended;

pub fn run(s: &mut Session, intended: &mut Intended) {
    s.group("#group", |s| {
        let output = s.group("EXAMPLE", |s| {
            s.assert("runs its body", |_| true);
            "example output"
        });
        s.assert("returns output of block", |_| output == Some("example output"));

        let output = intended.should_err(s, |s| {
            s.group((), |_| -> u8 { panic!("Example Error") })
        });
        s.assert("returns nothing when the block panics", |_| output == Some(None));

        let output = intended.should_err(s, |s| s.try_group("try", |_| "x".parse::<u8>()));
        s.assert("returns nothing when the block returns Err", |_| output == Some(None));

        s.group("can have labels of other types", |s| {
            s.group(42_u32, |s| {
                s.group('c', |s| intended.should_fail(s, |s| s.assert((), |_| false)))
            })
        });

        s.group("paths", |s| {
            s.assert("are joined with the separator", |s| {
                s.path().to_string() == "#group > paths > are joined with the separator"
            })
        });

        s.group((), |s| {
            s.assert("unlabeled groups add nothing", |s| {
                s.path().to_string() == "#group > unlabeled groups add nothing"
            })
        });

        intended.should_fail(s, |s| s.group("empty groups fail", |_| ()));
    });
}
