use crate::error::FactoryFailure;

/// A raw record: the fields of one source line, in order
pub type Row = Vec<String>;

/// Turns the raw fields of one record into a row of the caller's choosing.
///
/// Builders are pure: the parser may call them once per record and makes no
/// promise about anything beyond that. Closures with the right signature are
/// builders too.
pub trait RowBuilder {
    type Output;

    fn build(&self, fields: Row) -> Result<Self::Output, FactoryFailure>;
}

impl<F, T> RowBuilder for F
where
    F: Fn(Row) -> Result<T, FactoryFailure>,
{
    type Output = T;

    fn build(&self, fields: Row) -> Result<T, FactoryFailure> {
        self(fields)
    }
}

/// Keeps each record as its list of fields
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityBuilder;

impl RowBuilder for IdentityBuilder {
    type Output = Row;

    fn build(&self, fields: Row) -> Result<Row, FactoryFailure> {
        Ok(fields)
    }
}

/// One entry of a star catalogue (`StarID,ProperName,X,Y,Z`)
#[derive(Debug, Clone, PartialEq)]
pub struct StarRecord {
    pub star_id: u64,
    pub proper_name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Builds `StarRecord`s, rejecting rows with the wrong width or non-numeric
/// id/coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct StarBuilder;

impl StarBuilder {
    const COLUMNS: usize = 5;
}

impl RowBuilder for StarBuilder {
    type Output = StarRecord;

    fn build(&self, fields: Row) -> Result<StarRecord, FactoryFailure> {
        if fields.len() != Self::COLUMNS {
            return Err(FactoryFailure::new(
                format!(
                    "expected {} fields, found {}",
                    Self::COLUMNS,
                    fields.len()
                ),
                fields,
            ));
        }

        let star_id = match fields[0].trim().parse::<u64>() {
            Ok(id) => id,
            Err(_) => {
                let message = format!("StarID '{}' is not a whole number", fields[0]);
                return Err(FactoryFailure::new(message, fields));
            }
        };

        let mut coords = [0.0f64; 3];
        for (i, coord) in coords.iter_mut().enumerate() {
            let raw = &fields[i + 2];
            *coord = match raw.trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    let message = format!("coordinate '{}' is not a number", raw);
                    return Err(FactoryFailure::new(message, fields));
                }
            };
        }

        Ok(StarRecord {
            star_id,
            proper_name: fields[1].clone(),
            x: coords[0],
            y: coords[1],
            z: coords[2],
        })
    }
}
