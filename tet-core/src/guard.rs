/// Interlock that keeps assertion-style operations from nesting.
///
/// While an `assert`, `deny` or `err` body runs, the guard holds a short
/// description of that operation. Groups do not touch it, so a group inside an
/// assertion body is allowed, but an assertion inside one is not.
#[derive(Debug, Default)]
pub(crate) struct NestingGuard {
    active: Option<String>,
}

impl NestingGuard {
    /// Claim the guard, or return the description of the operation already holding it.
    pub(crate) fn claim(&mut self, reason: String) -> Result<(), String> {
        match &self.active {
            Some(holder) => Err(holder.clone()),
            None => {
                self.active = Some(reason);
                Ok(())
            }
        }
    }

    pub(crate) fn release(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn second_claim_is_rejected_with_holder() {
        let mut guard = NestingGuard::default();
        assert_eq!(guard.claim("assert(\"outer\")".into()), Ok(()));
        assert_eq!(
            guard.claim("err(\"inner\")".into()),
            Err("assert(\"outer\")".to_string())
        );
    }

    #[test]
    fn release_allows_a_new_claim() {
        let mut guard = NestingGuard::default();
        guard.claim("assert(\"a\")".into()).unwrap();
        guard.release();
        assert_eq!(guard.claim("assert(\"b\")".into()), Ok(()));
    }
}
