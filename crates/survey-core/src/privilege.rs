use tracing::{debug, info, warn};

use crate::config::SuperuserSet;
use crate::error::Result;
use crate::model::{ResSharedTo, ResponseReadPrivilegeInfo, UserId};

/// Decides whether a caller may read the responses of a questionnaire.
///
/// First match wins:
///
/// | res_shared_to  | administrator | respondent | result |
/// |----------------|---------------|------------|--------|
/// | public         | any           | any        | true   |
/// | administrators | true          | any        | true   |
/// | administrators | false         | any        | false  |
/// | respondents    | true          | any        | true   |
/// | respondents    | false         | true       | true   |
/// | respondents    | false         | false      | false  |
///
/// Any other `res_shared_to` fails with `InvalidSharingPolicy`.
pub fn resolve(info: &ResponseReadPrivilegeInfo) -> Result<bool> {
    let policy = info.res_shared_to.parse::<ResSharedTo>().inspect_err(|_| {
        warn!(
            res_shared_to = %info.res_shared_to,
            "questionnaire carries an unknown sharing policy"
        );
    })?;

    Ok(match policy {
        ResSharedTo::Public => true,
        ResSharedTo::Administrators => info.is_administrator,
        ResSharedTo::Respondents => info.is_administrator || info.is_respondent,
    })
}

/// [`resolve`] plus the injected superuser bypass.
#[derive(Debug, Clone, Default)]
pub struct PrivilegeResolver {
    superusers: SuperuserSet,
}

impl PrivilegeResolver {
    pub fn new(superusers: SuperuserSet) -> Self {
        Self { superusers }
    }

    pub fn is_superuser(&self, user: &UserId) -> bool {
        self.superusers.contains(user)
    }

    pub fn can_read(&self, user: &UserId, info: &ResponseReadPrivilegeInfo) -> Result<bool> {
        if self.is_superuser(user) {
            info!(user = %user, "superuser bypasses read privilege check");
            return Ok(true);
        }

        let allowed = resolve(info)?;
        debug!(
            user = %user,
            res_shared_to = %info.res_shared_to,
            is_administrator = info.is_administrator,
            is_respondent = info.is_respondent,
            allowed,
            "resolved read privilege"
        );
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superusers_skip_the_policy_table_even_for_broken_policies() {
        let resolver = PrivilegeResolver::new(SuperuserSet::new(["root"]));
        let info = ResponseReadPrivilegeInfo {
            res_shared_to: "nobody".into(),
            is_administrator: false,
            is_respondent: false,
        };
        assert!(resolver.can_read(&UserId::from("root"), &info).unwrap());
        assert!(resolver.can_read(&UserId::from("guest"), &info).is_err());
    }
}
