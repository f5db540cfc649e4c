use rusqlite::{params, Connection, OptionalExtension, Row};

use shared_models::DoctorAccount;

use crate::error::DatabaseError;

const SELECT: &str = "SELECT did, name, password_hex, admin, department, description FROM doctors";

fn map_doctor(row: &Row<'_>) -> rusqlite::Result<DoctorAccount> {
    Ok(DoctorAccount {
        did: row.get(0)?,
        name: row.get(1)?,
        password_hex: row.get(2)?,
        admin: row.get(3)?,
        department: row.get(4)?,
        description: row.get(5)?,
    })
}

fn query_doctors<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<DoctorAccount>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let doctors = stmt
        .query_map(params, map_doctor)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(doctors)
}

pub fn insert_doctor(conn: &Connection, doctor: &DoctorAccount) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (did, name, password_hex, admin, department, description) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            doctor.did,
            doctor.name,
            doctor.password_hex,
            doctor.admin,
            doctor.department,
            doctor.description,
        ],
    )?;
    Ok(())
}

pub fn update_doctor(conn: &Connection, doctor: &DoctorAccount) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET name = ?1, password_hex = ?2, admin = ?3, department = ?4, description = ?5 WHERE did = ?6",
        params![
            doctor.name,
            doctor.password_hex,
            doctor.admin,
            doctor.department,
            doctor.description,
            doctor.did,
        ],
    )?;
    Ok(changed)
}

pub fn delete_doctor(conn: &Connection, did: &str) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM doctors WHERE did = ?1", params![did])?)
}

/// First doctor matching the id OR the name. Blank values never match.
pub fn find_doctor(
    conn: &Connection,
    did: Option<&str>,
    name: Option<&str>,
) -> Result<Option<DoctorAccount>, DatabaseError> {
    let did = did.filter(|v| !v.trim().is_empty());
    let name = name.filter(|v| !v.trim().is_empty());
    if did.is_none() && name.is_none() {
        return Ok(None);
    }

    let sql = format!("{} WHERE did = ?1 OR name = ?2 LIMIT 1", SELECT);
    Ok(conn.query_row(&sql, params![did, name], map_doctor).optional()?)
}

pub fn find_doctor_in_department(
    conn: &Connection,
    name: &str,
    department: &str,
) -> Result<Option<DoctorAccount>, DatabaseError> {
    let sql = format!("{} WHERE name = ?1 AND department = ?2 LIMIT 1", SELECT);
    Ok(conn.query_row(&sql, params![name, department], map_doctor).optional()?)
}

pub fn find_doctors_by_department(conn: &Connection, department: &str) -> Result<Vec<DoctorAccount>, DatabaseError> {
    query_doctors(conn, &format!("{} WHERE department = ?1 ORDER BY did", SELECT), params![department])
}

pub fn find_doctors_by_name(conn: &Connection, name: &str) -> Result<Vec<DoctorAccount>, DatabaseError> {
    query_doctors(conn, &format!("{} WHERE name = ?1 ORDER BY did", SELECT), params![name])
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<DoctorAccount>, DatabaseError> {
    query_doctors(conn, &format!("{} ORDER BY department, did", SELECT), [])
}
