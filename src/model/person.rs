use std::collections::HashSet;
use log::{debug, trace, warn};
use serde::{Deserialize, Deserializer, Serialize};
use crate::core::Result;
use crate::cursor::RowReader;
use crate::options::RowReadOptions;
use crate::parcel::{ParcelReader, ParcelWriter, Parcelable};
use crate::schema::PersonTable;
use crate::values::ContentValues;

/// A row of the `person` table.
///
/// Every setter also writes its value into the persistence map, so the map
/// always holds exactly the fields that were set, with their latest values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "PersonFields", from = "PersonFields")]
pub struct Person {
    row_id: i64,
    name: Option<String>,
    age: i32,
    alive: bool,
    body_fat: f64,
    id_place: i64,

    values: ContentValues,
}

/// Plain JSON shape of a `Person`. Absent keys are left unset.
///
/// `name` is doubly optional: a missing key leaves the name unset, while
/// `"name": null` records an explicit NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonFields {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub row_id: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_place: Option<i64>,
}

impl Person {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================
    // Row construction
    // ========================================

    /// Reads every known, non-null column of the current row.
    pub fn from_row<R: RowReader + ?Sized>(reader: &R) -> Result<Self> {
        Self::from_row_with(reader, &RowReadOptions::new())
    }

    /// Like `from_row`, reading only columns named in `fields`.
    pub fn from_row_with_fields<R: RowReader + ?Sized>(
        reader: &R,
        fields: Option<&HashSet<String>>,
    ) -> Result<Self> {
        Self::from_row_with(reader, &RowReadOptions::new().field_set(fields.cloned()))
    }

    /// Reads the current row. A column is copied only if it exists, is not
    /// NULL and passes the restriction set; everything else stays unset.
    pub fn from_row_with<R: RowReader + ?Sized>(reader: &R, options: &RowReadOptions) -> Result<Self> {
        let mut person = Self::new();

        if let Some(idx) = present_column(reader, options, PersonTable::_ID)? {
            person.set_row_id(reader.get_i64(idx)?);
        }
        if let Some(idx) = present_column(reader, options, PersonTable::NAME)? {
            person.set_name(reader.get_string(idx)?);
        }
        if let Some(idx) = present_column(reader, options, PersonTable::AGE)? {
            person.set_age(reader.get_i32(idx)?);
        }
        if let Some(idx) = present_column(reader, options, PersonTable::ALIVE)? {
            person.set_alive(reader.get_i32(idx)? != 0);
        }
        if let Some(idx) = present_column(reader, options, PersonTable::BODY_FAT)? {
            person.set_body_fat(reader.get_f64(idx)?);
        }
        if let Some(idx) = present_column(reader, options, PersonTable::ID_PLACE)? {
            person.set_id_place(reader.get_i64(idx)?);
        }

        Ok(person)
    }

    /// One `Person` per row, in row order. A missing reader, or one with no
    /// rows, gives an empty list.
    pub fn list_from_rows<R: RowReader + ?Sized>(
        reader: Option<&mut R>,
        fields: Option<&HashSet<String>>,
    ) -> Result<Vec<Self>> {
        Self::list_from_rows_with(reader, &RowReadOptions::new().field_set(fields.cloned()))
    }

    pub fn list_from_rows_with<R: RowReader + ?Sized>(
        reader: Option<&mut R>,
        options: &RowReadOptions,
    ) -> Result<Vec<Self>> {
        let mut list = Vec::new();

        let Some(reader) = reader else {
            return Ok(list);
        };

        if reader.move_to_first()? {
            loop {
                list.push(Self::from_row_with(&*reader, options)?);
                if !reader.move_to_next()? {
                    break;
                }
            }
        }

        debug!("Materialized {} person row(s)", list.len());
        Ok(list)
    }

    // ========================================
    // Setters (write-through)
    // ========================================

    pub fn set_row_id(&mut self, row_id: i64) {
        self.row_id = row_id;
        self.values.put(PersonTable::_ID, row_id);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.values.put(PersonTable::NAME, name.as_str());
        self.name = Some(name);
    }

    /// Sets the name to NULL; the map records an explicit NULL.
    pub fn clear_name(&mut self) {
        self.name = None;
        self.values.put_null(PersonTable::NAME);
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
        self.values.put(PersonTable::AGE, age);
    }

    pub fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
        self.values.put(PersonTable::ALIVE, alive);
    }

    pub fn set_body_fat(&mut self, body_fat: f64) {
        self.body_fat = body_fat;
        self.values.put(PersonTable::BODY_FAT, body_fat);
    }

    pub fn set_id_place(&mut self, id_place: i64) {
        self.id_place = id_place;
        self.values.put(PersonTable::ID_PLACE, id_place);
    }

    // ========================================
    // Getters
    // ========================================

    pub fn row_id(&self) -> i64 {
        self.row_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn alive(&self) -> bool {
        self.alive
    }

    pub fn body_fat(&self) -> f64 {
        self.body_fat
    }

    pub fn id_place(&self) -> i64 {
        self.id_place
    }

    /// The live persistence map.
    pub fn content_values(&self) -> &ContentValues {
        &self.values
    }

    pub fn to_content_values(&self) -> ContentValues {
        self.values.clone()
    }

    /// Whether `column` has been set on this record.
    pub fn is_set(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

/// Index of `column` if the row has it, it is not NULL and the options allow it.
fn present_column<R: RowReader + ?Sized>(
    reader: &R,
    options: &RowReadOptions,
    column: &str,
) -> Result<Option<usize>> {
    let name = options.column_name(column);

    let Some(idx) = reader.column_index(&name)? else {
        trace!("Column '{}' not in row, skipping", name);
        return Ok(None);
    };
    if reader.is_null(idx)? {
        trace!("Column '{}' is NULL, skipping", name);
        return Ok(None);
    }
    if !options.allows(&name) {
        trace!("Column '{}' not requested, skipping", name);
        return Ok(None);
    }

    Ok(Some(idx))
}

impl Parcelable for Person {
    fn write_to_parcel(&self, parcel: &mut dyn ParcelWriter, _flags: i32) -> Result<()> {
        parcel.write_i64(self.row_id)?;
        parcel.write_string(self.name())?;
        parcel.write_i32(self.age)?;
        parcel.write_i32(if self.alive { 1 } else { 0 })?;
        parcel.write_f64(self.body_fat)?;
        parcel.write_i64(self.id_place)?;
        Ok(())
    }

    fn create_from_parcel(parcel: &mut dyn ParcelReader) -> Result<Self> {
        let mut person = Self::new();

        person.set_row_id(parcel.read_i64()?);
        match parcel.read_string()? {
            Some(name) => person.set_name(name),
            None => person.clear_name(),
        }
        person.set_age(parcel.read_i32()?);

        let alive = parcel.read_i32()?;
        if alive != 0 && alive != 1 {
            warn!("Unexpected alive encoding {} in parcel, reading as false", alive);
        }
        person.set_alive(alive == 1);

        person.set_body_fat(parcel.read_f64()?);
        person.set_id_place(parcel.read_i64()?);

        Ok(person)
    }
}

/// A key that is present deserializes to `Some`, even when its value is null.
fn present_or_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<Person> for PersonFields {
    fn from(person: Person) -> Self {
        let set = |column: &str| person.is_set(column);
        Self {
            row_id: set(PersonTable::_ID).then_some(person.row_id),
            name: set(PersonTable::NAME).then(|| person.name.clone()),
            age: set(PersonTable::AGE).then_some(person.age),
            alive: set(PersonTable::ALIVE).then_some(person.alive),
            body_fat: set(PersonTable::BODY_FAT).then_some(person.body_fat),
            id_place: set(PersonTable::ID_PLACE).then_some(person.id_place),
        }
    }
}

impl From<PersonFields> for Person {
    fn from(fields: PersonFields) -> Self {
        let mut person = Self::new();
        if let Some(row_id) = fields.row_id {
            person.set_row_id(row_id);
        }
        match fields.name {
            Some(Some(name)) => person.set_name(name),
            Some(None) => person.clear_name(),
            None => {}
        }
        if let Some(age) = fields.age {
            person.set_age(age);
        }
        if let Some(alive) = fields.alive {
            person.set_alive(alive);
        }
        if let Some(body_fat) = fields.body_fat {
            person.set_body_fat(body_fat);
        }
        if let Some(id_place) = fields.id_place {
            person.set_id_place(id_place);
        }
        person
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    #[test]
    fn test_default_is_empty() {
        let person = Person::new();
        assert_eq!(person.row_id(), 0);
        assert_eq!(person.name(), None);
        assert_eq!(person.age(), 0);
        assert!(!person.alive());
        assert_eq!(person.body_fat(), 0.0);
        assert_eq!(person.id_place(), 0);
        assert!(person.content_values().is_empty());
    }

    #[test]
    fn test_setter_writes_only_its_key() {
        let mut person = Person::new();
        person.set_age(30);
        person.set_name("Ann");

        let before = person.to_content_values();
        person.set_body_fat(0.21);

        let values = person.content_values();
        assert_eq!(values.len(), before.len() + 1);
        assert_eq!(values.get(PersonTable::BODY_FAT), Some(&Value::Float(0.21)));
        for (key, value) in &before {
            assert_eq!(values.get(key), Some(value));
        }
    }

    #[test]
    fn test_setter_overwrites() {
        let mut person = Person::new();
        person.set_alive(true);
        person.set_alive(false);
        assert_eq!(person.content_values().get(PersonTable::ALIVE), Some(&Value::Boolean(false)));
        assert_eq!(person.content_values().len(), 1);
    }

    #[test]
    fn test_clear_name_records_null() {
        let mut person = Person::new();
        person.set_name("Ann");
        person.clear_name();
        assert_eq!(person.name(), None);
        assert!(person.is_set(PersonTable::NAME));
        assert_eq!(person.content_values().get(PersonTable::NAME), Some(&Value::Null));
    }

    #[test]
    fn test_describe_contents_and_new_array() {
        assert_eq!(Person::new().describe_contents(), 0);
        let array = Person::new_array(3);
        assert_eq!(array.len(), 3);
        assert!(array.iter().all(Option::is_none));
    }

    #[test]
    fn test_json_skips_unset_fields() {
        let mut person = Person::new();
        person.set_name("Ann");
        person.set_age(30);
        assert_eq!(serde_json::to_string(&person).unwrap(), r#"{"name":"Ann","age":30}"#);

        let back: Person = serde_json::from_str(r#"{"_id":4,"alive":true}"#).unwrap();
        assert_eq!(back.row_id(), 4);
        assert!(back.alive());
        assert_eq!(back.content_values().len(), 2);
    }

    #[test]
    fn test_json_keeps_cleared_name() {
        let mut person = Person::new();
        person.set_age(3);
        person.clear_name();

        let json = serde_json::to_string(&person).unwrap();
        assert_eq!(json, r#"{"name":null,"age":3}"#);

        let back: Person = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name(), None);
        assert!(back.is_set(PersonTable::NAME));
        assert_eq!(back.content_values(), person.content_values());
    }
}
