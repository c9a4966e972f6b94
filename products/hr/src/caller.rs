use platform_authz::Grants;

/// Identity resolved upstream for the current request. Every service call
/// takes it explicitly; nothing reads ambient auth state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub company_id: i64,
    pub grants: Grants,
}

impl Caller {
    pub fn new(user_id: i64, company_id: i64) -> Self {
        Self {
            user_id,
            company_id,
            grants: Grants::default(),
        }
    }

    pub fn with_grants(mut self, grants: Grants) -> Self {
        self.grants = grants;
        self
    }
}
