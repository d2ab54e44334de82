use super::*;

/// Stable identifier of one repeatable row.
///
/// Ids never change when sibling rows are added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(Uuid);

impl RowId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RowId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.simple())
    }
}

impl Serialize for RowId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// One row inside a repeatable group.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatableRow {
    id: RowId,
    values: FormValues,
}

impl RepeatableRow {
    /// Returns the row id.
    #[must_use]
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Returns the row's values keyed by row field id.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Returns one row value.
    #[must_use]
    pub fn value(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }
}

impl WizardController {
    /// Returns a group's rows in insertion order.
    #[must_use]
    pub fn rows(&self, group_key: &str) -> &[RepeatableRow] {
        self.rows.get(group_key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Appends an empty row to a repeatable group.
    pub fn add_row(&mut self, group_key: &str) -> AppResult<RowId> {
        let group = self
            .definition
            .group(group_key)
            .ok_or_else(|| AppError::NotFound(format!("repeatable group '{group_key}'")))?;
        let max_rows = group.max_rows();

        let rows = self.rows.entry(group_key.to_owned()).or_default();
        if let Some(max_rows) = max_rows
            && rows.len() >= max_rows
        {
            return Err(AppError::Conflict(format!(
                "repeatable group '{group_key}' already has {max_rows} rows"
            )));
        }

        let id = RowId::generate();
        rows.push(RepeatableRow {
            id,
            values: FormValues::new(),
        });
        let row_count = rows.len();
        self.refresh_group_error(group_key);
        debug!(group = group_key, row = %id, row_count, "repeatable row added");
        Ok(id)
    }

    /// Removes one row; remaining rows keep their ids and values.
    pub fn remove_row(&mut self, group_key: &str, row_id: RowId) -> AppResult<()> {
        let rows = self
            .rows
            .get_mut(group_key)
            .ok_or_else(|| AppError::NotFound(format!("repeatable group '{group_key}'")))?;
        let position = rows
            .iter()
            .position(|row| row.id == row_id)
            .ok_or_else(|| AppError::NotFound(format!("row '{row_id}' in group '{group_key}'")))?;

        rows.remove(position);
        self.errors.remove_row(group_key, row_id);
        self.refresh_group_error(group_key);
        debug!(group = group_key, row = %row_id, "repeatable row removed");
        Ok(())
    }

    /// Records a value for one field of one row.
    pub fn set_row_value(
        &mut self,
        group_key: &str,
        row_id: RowId,
        field_id: &str,
        value: Value,
    ) -> AppResult<()> {
        let group = self
            .definition
            .group(group_key)
            .ok_or_else(|| AppError::NotFound(format!("repeatable group '{group_key}'")))?;
        if group.row_field(field_id).is_none() {
            return Err(AppError::NotFound(format!(
                "row field '{field_id}' in group '{group_key}'"
            )));
        }

        let row = self
            .rows
            .get_mut(group_key)
            .and_then(|rows| rows.iter_mut().find(|row| row.id == row_id))
            .ok_or_else(|| AppError::NotFound(format!("row '{row_id}' in group '{group_key}'")))?;
        row.values.insert(field_id.to_owned(), value);
        Ok(())
    }
}
