mod assertion;
mod err;
mod group;
mod helpers;
mod nesting;

use console::Term;
use std::process::ExitCode;
use tet::eyre;

use helpers::Intended;

fn main() -> eyre::Result<ExitCode> {
    let mut intended = Intended::default();
    let app = tet::App::new();
    let summary = app.run(|s| {
        assertion::run(s, &mut intended);
        group::run(s, &mut intended);
        err::run(s, &mut intended);
        nesting::run(s, &mut intended);
        #[cfg(feature = "fail-test")]
        fail_test::run(s);
    })?;

    let tally = intended.tally(&summary);
    tally.print(&Term::stdout())?;
    Ok(tally.exit_code())
}
