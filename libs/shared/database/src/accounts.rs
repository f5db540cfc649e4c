use rusqlite::{params, Connection, OptionalExtension};

use shared_models::{PatientAccount, Sex};

use crate::error::DatabaseError;

const COLUMNS: &str = "aid, name, password_hex, pid, phone, sex";

struct AccountRow {
    aid: String,
    name: String,
    password_hex: String,
    pid: String,
    phone: String,
    sex: String,
}

impl AccountRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            aid: row.get(0)?,
            name: row.get(1)?,
            password_hex: row.get(2)?,
            pid: row.get(3)?,
            phone: row.get(4)?,
            sex: row.get(5)?,
        })
    }

    fn into_account(self) -> Result<PatientAccount, DatabaseError> {
        let sex: Sex = self
            .sex
            .parse()
            .map_err(|e: String| DatabaseError::corrupt("accounts", e))?;
        Ok(PatientAccount {
            aid: self.aid,
            name: self.name,
            password_hex: self.password_hex,
            pid: self.pid,
            phone: self.phone,
            sex,
        })
    }
}

/// Blank identifiers are treated as absent so they never match.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn insert_account(conn: &Connection, account: &PatientAccount) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO accounts (aid, name, password_hex, pid, phone, sex) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            account.aid,
            account.name,
            account.password_hex,
            account.pid,
            account.phone,
            account.sex.to_string(),
        ],
    )?;
    Ok(())
}

/// First account matching ANY of the supplied identifiers.
pub fn find_account(
    conn: &Connection,
    aid: Option<&str>,
    pid: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<PatientAccount>, DatabaseError> {
    let (aid, pid, phone) = (present(aid), present(pid), present(phone));
    if aid.is_none() && pid.is_none() && phone.is_none() {
        return Ok(None);
    }

    let sql = format!(
        "SELECT {} FROM accounts WHERE aid = ?1 OR pid = ?2 OR phone = ?3 LIMIT 1",
        COLUMNS
    );
    let row = conn
        .query_row(&sql, params![aid, pid, phone], AccountRow::from_row)
        .optional()?;

    row.map(AccountRow::into_account).transpose()
}

/// Overwrites name, credential, phone and sex. The national id is never touched.
pub fn update_account_info(conn: &Connection, account: &PatientAccount) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE accounts SET name = ?1, password_hex = ?2, phone = ?3, sex = ?4 WHERE aid = ?5",
        params![
            account.name,
            account.password_hex,
            account.phone,
            account.sex.to_string(),
            account.aid,
        ],
    )?;
    Ok(changed)
}

pub fn delete_account(conn: &Connection, aid: &str) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM accounts WHERE aid = ?1", params![aid])?)
}
