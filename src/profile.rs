use anyhow::{ensure, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ユーザー名の最大文字数。
pub const MAX_USERNAME_LEN: usize = 150;
/// 姓、名それぞれの最大文字数。
pub const MAX_PERSON_NAME_LEN: usize = 30;
/// 電話番号の最大文字数。
pub const MAX_PHONE_LEN: usize = 15;
/// 役職名の最大文字数。
pub const MAX_POSITION_LEN: usize = 100;

/// 役職。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: u64,
    pub name: String,
}

/// タスクを担当するユーザーのプロフィール。
///
/// `username`はタスクの担当者として参照されるため、作成後は変更できない。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub position_id: Option<u64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
}

impl User {
    /// 姓名を空白区切りで返す。どちらも空の場合は空文字列になる。
    pub fn full_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 役職名を解決したユーザー。一覧表示に利用する。
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub user: User,
    pub position: Option<String>,
}

/// 新しく作成するユーザーの入力値。
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub position_id: Option<u64>,
    pub phone: Option<String>,
    pub birth: Option<NaiveDate>,
    pub description: String,
}

impl NewUser {
    /// 入力値を検証する。
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.username.trim().is_empty(), "Username must not be empty");
        ensure!(
            self.username.chars().count() <= MAX_USERNAME_LEN,
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        );
        validate_email(&self.email)?;
        validate_person_name(&self.first_name)?;
        validate_person_name(&self.last_name)?;
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }
}

/// ユーザーの更新内容。`None`の項目は変更しない。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position_id: Option<u64>,
    pub phone: Option<String>,
    pub birth: Option<NaiveDate>,
    pub description: Option<String>,
}

impl UserChanges {
    /// 入力値を検証する。
    pub fn validate(&self) -> Result<()> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(first_name) = &self.first_name {
            validate_person_name(first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate_person_name(last_name)?;
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }

    /// ユーザーに更新内容を反映する。
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(position_id) = self.position_id {
            user.position_id = Some(position_id);
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(birth) = self.birth {
            user.birth = Some(birth);
        }
        if let Some(description) = self.description {
            user.description = description;
        }
    }
}

/// 役職名を検証する。
pub fn validate_position_name(name: &str) -> Result<()> {
    ensure!(!name.trim().is_empty(), "Position must not be empty");
    ensure!(
        name.chars().count() <= MAX_POSITION_LEN,
        "Position must be at most {} characters",
        MAX_POSITION_LEN
    );
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .map_or(false, |(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        });
    ensure!(
        valid && !email.chars().any(char::is_whitespace),
        "Invalid email: {}",
        email
    );
    Ok(())
}

fn validate_person_name(name: &str) -> Result<()> {
    ensure!(
        name.chars().count() <= MAX_PERSON_NAME_LEN,
        "Name must be at most {} characters: {}",
        MAX_PERSON_NAME_LEN,
        name
    );
    Ok(())
}

fn validate_phone(phone: &str) -> Result<()> {
    ensure!(
        phone.chars().count() <= MAX_PHONE_LEN,
        "Phone must be at most {} characters: {}",
        MAX_PHONE_LEN,
        phone
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::{validate_position_name, NewUser, User, UserChanges};

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: "Alice".to_string(),
            last_name: "Silva".to_string(),
            position_id: None,
            phone: Some("+55 11 5555".to_string()),
            birth: None,
            description: String::new(),
        }
    }

    fn dummy_user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: String::new(),
            position_id: None,
            phone: None,
            birth: None,
            description: String::new(),
        }
    }

    #[rstest]
    #[case::valid("alice", "alice@example.com", true)]
    #[case::empty_username(" ", "alice@example.com", false)]
    #[case::too_long_username(&"a".repeat(151), "alice@example.com", false)]
    #[case::empty_email("alice", "", false)]
    #[case::no_at("alice", "alice.example.com", false)]
    #[case::no_domain("alice", "alice@", false)]
    #[case::two_at("alice", "a@b@c", false)]
    #[case::space_in_email("alice", "al ice@example.com", false)]
    fn test_new_user_validate(#[case] username: &str, #[case] email: &str, #[case] is_ok: bool) {
        assert_eq!(new_user(username, email).validate().is_ok(), is_ok);
    }

    #[test]
    fn test_new_user_validate_limits() {
        let mut user = new_user("alice", "alice@example.com");
        user.phone = Some("0".repeat(16));
        assert!(user.validate().is_err());

        let mut user = new_user("alice", "alice@example.com");
        user.last_name = "b".repeat(31);
        assert!(user.validate().is_err());
    }

    #[rstest]
    #[case::valid("Developer", true)]
    #[case::empty("", false)]
    #[case::too_long(&"p".repeat(101), false)]
    fn test_validate_position_name(#[case] name: &str, #[case] is_ok: bool) {
        assert_eq!(validate_position_name(name).is_ok(), is_ok);
    }

    #[rstest]
    #[case::both("Alice", "Silva", "Alice Silva")]
    #[case::first_only("Alice", "", "Alice")]
    #[case::last_only("", "Silva", "Silva")]
    #[case::none("", "", "")]
    fn test_full_name(#[case] first_name: &str, #[case] last_name: &str, #[case] expected: &str) {
        let user = User {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..dummy_user()
        };

        assert_eq!(user.full_name(), expected);
    }

    /// 指定した項目だけが更新される。
    #[test]
    fn test_user_changes_apply() {
        let mut user = dummy_user();
        let birth = NaiveDate::from_ymd_opt(1990, 2, 1).unwrap();
        let changes = UserChanges {
            position_id: Some(2),
            birth: Some(birth),
            ..Default::default()
        };

        changes.apply(&mut user);

        assert_eq!(user.position_id, Some(2));
        assert_eq!(user.birth, Some(birth));
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.first_name, "Alice");
    }

    #[test]
    fn test_user_changes_validate() {
        let changes = UserChanges {
            email: Some("invalid".to_string()),
            ..Default::default()
        };

        assert!(changes.validate().is_err());
        assert!(UserChanges::default().validate().is_ok());
    }
}
