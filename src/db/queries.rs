use crate::db::Database;
use crate::error::{CropRotaError, Result};
use crate::models::{Field, RotationPlan, RotationYear, SoilType};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

// Field Queries

impl Database {
    /// Stores the field and the plan built for its new id in one transaction.
    /// Nothing is stored when `build_plan` fails.
    pub fn create_field_with_plan<F>(&self, field: &Field, build_plan: F) -> Result<RotationPlan>
    where
        F: FnOnce(i64) -> Result<RotationPlan>,
    {
        field.validate()?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let id = insert_field(&tx, field)?;
            let plan = build_plan(id)?;
            insert_plan(&tx, &plan)?;
            tx.commit()?;
            Ok(plan)
        })
    }

    pub fn list_fields(&self) -> Result<Vec<Field>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM fields ORDER BY id")?;
            let fields = stmt
                .query_map([], row_to_field)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(fields)
        })
    }

    pub fn get_field(&self, id: i64) -> Result<Option<Field>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM fields WHERE id = ?1", [id], row_to_field)
                .optional()
                .map_err(Into::into)
        })
    }

    /// Deletes the field and, through the foreign key, its plans.
    pub fn delete_field(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM fields WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(CropRotaError::NotFound(format!("field {}", id)));
            }
            Ok(())
        })
    }
}

fn insert_field(conn: &Connection, field: &Field) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO fields
            (name, size_acres, soil_type, current_crop, ph, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            field.name,
            field.size_acres,
            field.soil_type.code(),
            field.current_crop,
            field.ph,
            field.created_at.to_rfc3339(),
            field.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_field(row: &Row) -> rusqlite::Result<Field> {
    let soil_type_str: String = row.get("soil_type")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    let soil_type = SoilType::from_str(&soil_type_str).unwrap_or_else(|| {
        warn!(
            soil_type = %soil_type_str,
            "Unknown soil_type in database, defaulting to SandyLoam"
        );
        SoilType::SandyLoam
    });

    Ok(Field {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        size_acres: row.get("size_acres")?,
        soil_type,
        current_crop: row.get("current_crop")?,
        ph: row.get("ph")?,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

// Rotation Plan Queries

impl Database {
    pub fn create_plan(&self, plan: &RotationPlan) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            insert_plan(&tx, plan)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// All plans, newest first.
    pub fn list_plans(&self) -> Result<Vec<RotationPlan>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, field_id, created_at FROM rotation_plans ORDER BY created_at DESC, rowid DESC",
            )?;
            let headers: Vec<PlanHeader> = stmt
                .query_map([], row_to_plan_header)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            headers
                .into_iter()
                .map(|h| load_plan_years(conn, h))
                .collect()
        })
    }

    pub fn plans_for_field(&self, field_id: i64) -> Result<Vec<RotationPlan>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, field_id, created_at FROM rotation_plans WHERE field_id = ?1 ORDER BY created_at DESC, rowid DESC",
            )?;
            let headers: Vec<PlanHeader> = stmt
                .query_map([field_id], row_to_plan_header)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            headers
                .into_iter()
                .map(|h| load_plan_years(conn, h))
                .collect()
        })
    }

    pub fn delete_plan(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM rotation_plans WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(CropRotaError::NotFound(format!("plan {}", id)));
            }
            Ok(())
        })
    }
}

fn insert_plan(conn: &Connection, plan: &RotationPlan) -> Result<()> {
    conn.execute(
        "INSERT INTO rotation_plans (id, field_id, created_at) VALUES (?1, ?2, ?3)",
        params![plan.id, plan.field_id, plan.created_at.to_rfc3339()],
    )?;
    for year in &plan.years {
        conn.execute(
            "INSERT INTO plan_years (plan_id, year, crop) VALUES (?1, ?2, ?3)",
            params![plan.id, year.year, year.crop],
        )?;
    }
    Ok(())
}

struct PlanHeader {
    id: String,
    field_id: i64,
    created_at: DateTime<Utc>,
}

fn row_to_plan_header(row: &Row) -> rusqlite::Result<PlanHeader> {
    let created_at_str: String = row.get("created_at")?;
    Ok(PlanHeader {
        id: row.get("id")?,
        field_id: row.get("field_id")?,
        created_at: parse_timestamp(&created_at_str),
    })
}

fn load_plan_years(conn: &Connection, header: PlanHeader) -> Result<RotationPlan> {
    let mut stmt = conn.prepare("SELECT year, crop FROM plan_years WHERE plan_id = ?1 ORDER BY year")?;
    let years = stmt
        .query_map([&header.id], |row| {
            Ok(RotationYear {
                year: row.get("year")?,
                crop: row.get("crop")?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(RotationPlan {
        id: header.id,
        field_id: header.field_id,
        created_at: header.created_at,
        years,
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(timestamp = %s, "Unparseable timestamp in database, using now");
            Utc::now()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_field(db: &Database, crop: &str) -> Field {
        let mut field = Field::new("South Paddock".into(), SoilType::SiltyLoam, crop.into())
            .with_size(12.5)
            .with_ph(6.8);
        field.id = Some(db.with_conn(|conn| insert_field(conn, &field)).unwrap());
        field
    }

    #[test]
    fn field_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let field = saved_field(&db, "Soybeans");

        let loaded = db.get_field(field.id.unwrap()).unwrap().unwrap();
        assert_eq!(loaded.name, "South Paddock");
        assert_eq!(loaded.size_acres, 12.5);
        assert_eq!(loaded.soil_type, SoilType::SiltyLoam);
        assert_eq!(loaded.current_crop, "Soybeans");
        assert_eq!(loaded.ph, 6.8);

        assert_eq!(db.list_fields().unwrap().len(), 1);
        assert!(db.get_field(999).unwrap().is_none());
    }

    #[test]
    fn invalid_field_is_not_stored() {
        let db = Database::open_in_memory().unwrap();
        let field = Field::new("Bad".into(), SoilType::PureSilt, "corn".into()).with_ph(15.0);

        let result = db.create_field_with_plan(&field, |id| {
            Ok(RotationPlan::from_sequence(id, vec!["corn".into()]))
        });
        assert!(matches!(result, Err(CropRotaError::InvalidData(_))));
        assert!(db.list_fields().unwrap().is_empty());
    }

    #[test]
    fn plan_round_trips_in_year_order() {
        let db = Database::open_in_memory().unwrap();
        let field = saved_field(&db, "wheat");
        let plan = RotationPlan::from_sequence(
            field.id.unwrap(),
            vec!["wheat".into(), "peas".into(), "corn".into(), "clover".into()],
        );
        db.create_plan(&plan).unwrap();

        let plans = db.plans_for_field(field.id.unwrap()).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].id, plan.id);
        assert_eq!(plans[0].years, plan.years);
    }

    #[test]
    fn list_plans_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let field = saved_field(&db, "corn");

        let mut older = RotationPlan::from_sequence(field.id.unwrap(), vec!["corn".into()]);
        older.created_at = Utc::now() - chrono::Duration::days(1);
        let newer = RotationPlan::from_sequence(field.id.unwrap(), vec!["corn".into()]);
        db.create_plan(&older).unwrap();
        db.create_plan(&newer).unwrap();

        let ids: Vec<String> = db.list_plans().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn delete_plan_by_id() {
        let db = Database::open_in_memory().unwrap();
        let field = saved_field(&db, "corn");
        let plan = RotationPlan::from_sequence(field.id.unwrap(), vec!["corn".into(), "peas".into()]);
        db.create_plan(&plan).unwrap();

        db.delete_plan(&plan.id).unwrap();
        assert!(db.list_plans().unwrap().is_empty());

        let err = db.delete_plan(&plan.id).unwrap_err();
        assert!(matches!(err, CropRotaError::NotFound(_)));
    }

    #[test]
    fn deleting_field_cascades_to_plans() {
        let db = Database::open_in_memory().unwrap();
        let field = saved_field(&db, "corn");
        let plan = RotationPlan::from_sequence(field.id.unwrap(), vec!["corn".into(), "beans".into()]);
        db.create_plan(&plan).unwrap();

        db.delete_field(field.id.unwrap()).unwrap();
        assert!(db.list_plans().unwrap().is_empty());
        let orphan_years: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM plan_years", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(orphan_years, 0);
    }

    #[test]
    fn unreadable_field_row_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        saved_field(&db, "corn");
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO fields (name, size_acres, soil_type, current_crop, ph, created_at, updated_at)
                 VALUES ('Garbled', 'abc', 'silty_loam', 'oats', 6.5, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.list_fields().is_err());
    }

    #[test]
    fn unreadable_plan_row_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let field = saved_field(&db, "corn");
        let plan = RotationPlan::from_sequence(field.id.unwrap(), vec!["corn".into()]);
        db.create_plan(&plan).unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE rotation_plans SET created_at = X'DEADBEEF'", [])?;
            Ok(())
        })
        .unwrap();

        assert!(db.list_plans().is_err());
        assert!(db.plans_for_field(field.id.unwrap()).is_err());
    }

    #[test]
    fn field_with_plan_is_stored_together() {
        let db = Database::open_in_memory().unwrap();
        let field = Field::new("North".into(), SoilType::SandyLoam, "peas".into());

        let plan = db
            .create_field_with_plan(&field, |id| {
                Ok(RotationPlan::from_sequence(id, vec!["peas".into(), "corn".into()]))
            })
            .unwrap();

        let fields = db.list_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(Some(plan.field_id), fields[0].id);
        assert_eq!(db.plans_for_field(plan.field_id).unwrap().len(), 1);
    }

    #[test]
    fn failed_plan_leaves_no_field_behind() {
        let db = Database::open_in_memory().unwrap();
        let field = Field::new("North".into(), SoilType::SandyLoam, "peas".into());

        let result = db.create_field_with_plan(&field, |_| {
            Err(CropRotaError::InvalidConfiguration("no years".into()))
        });

        assert!(result.is_err());
        assert!(db.list_fields().unwrap().is_empty());
        assert!(db.list_plans().unwrap().is_empty());
    }

    #[test]
    fn plan_for_missing_field_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let plan = RotationPlan::from_sequence(42, vec!["corn".into()]);
        assert!(db.create_plan(&plan).is_err());
    }
}
