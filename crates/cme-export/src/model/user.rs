use cme_confluence::types::{IssueRecord, LabelRecord, UserRecord, VersionRecord};

/// Wiki user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub account_id: String,
    pub username: String,
    pub display_name: String,
    pub public_name: String,
    pub email: String,
}

impl User {
    pub fn from_record(record: UserRecord) -> Self {
        Self {
            account_id: record.account_id,
            username: record.username,
            display_name: record.display_name,
            public_name: record.public_name,
            email: record.email,
        }
    }

    /// Display name without the license state suffixes Confluence appends.
    pub fn clean_name(&self) -> &str {
        clean_user_name(&self.display_name)
    }
}

/// Strip `(Unlicensed)` and `(Deactivated)` suffixes from a user name.
pub(crate) fn clean_user_name(name: &str) -> &str {
    let name = name.strip_suffix("(Unlicensed)").unwrap_or(name);
    let name = name.strip_suffix("(Deactivated)").unwrap_or(name);
    name.trim()
}

/// Content version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    pub number: u32,
    pub by: User,
    pub when: String,
    pub friendly_when: String,
}

impl Version {
    pub fn from_record(record: VersionRecord) -> Self {
        Self {
            number: record.number,
            by: User::from_record(record.by),
            when: record.when,
            friendly_when: record.friendly_when,
        }
    }
}

/// Page label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub prefix: String,
}

impl Label {
    pub fn from_record(record: LabelRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            prefix: record.prefix,
        }
    }
}

/// Jira issue summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JiraIssue {
    pub key: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
}

impl JiraIssue {
    pub fn from_record(record: IssueRecord) -> Self {
        Self {
            key: record.key,
            summary: record.fields.summary,
            description: record.fields.description,
            status: record.fields.status.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_clean_user_name() {
        assert_eq!(clean_user_name("Jane Doe (Unlicensed)"), "Jane Doe");
        assert_eq!(clean_user_name("Jane Doe (Deactivated)"), "Jane Doe");
        assert_eq!(clean_user_name("Jane Doe"), "Jane Doe");
    }

    #[test]
    fn test_issue_from_record() {
        let mut record = IssueRecord {
            key: "PROJ-7".to_owned(),
            ..IssueRecord::default()
        };
        "Crash on save".clone_into(&mut record.fields.summary);
        "Done".clone_into(&mut record.fields.status.name);

        let issue = JiraIssue::from_record(record);
        assert_eq!(issue.key, "PROJ-7");
        assert_eq!(issue.summary, "Crash on save");
        assert_eq!(issue.status, "Done");
        assert_eq!(issue.description, None);
    }
}
