//! Raw position report table, as read from a CSV source

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

pub const MMSI: &str = "MMSI";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";
pub const TIMESTAMP: &str = "Timestamp";
const SPEED: &str = "Speed";
const COURSE: &str = "Course";
const NAVIGATION_STATUS: &str = "Navigation Status";

pub const REQUIRED_COLUMNS: [&str; 4] = [MMSI, LATITUDE, LONGITUDE, TIMESTAMP];

/// Header and rows of the input, uninterpreted.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

/// Row as seen through the header, numeric cells that fail to parse are absent.
#[derive(Debug)]
pub(crate) struct RawRow<'a> {
    pub mmsi: Option<u64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<&'a str>,
    pub speed: Option<f64>,
    pub course: Option<f64>,
    pub navigation_status: Option<&'a str>,
}

/// Field to index map, first occurrence of each column wins
#[derive(Debug)]
struct FieldsIndex {
    mmsi: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    timestamp: Option<usize>,
    speed: Option<usize>,
    course: Option<usize>,
    navigation_status: Option<usize>,
}

impl FieldsIndex {
    fn parse_header(header: &StringRecord) -> Self {
        let find = |name: &str| header.iter().position(|h| h == name);

        Self {
            mmsi: find(MMSI),
            latitude: find(LATITUDE),
            longitude: find(LONGITUDE),
            timestamp: find(TIMESTAMP),
            speed: find(SPEED),
            course: find(COURSE),
            navigation_status: find(NAVIGATION_STATUS),
        }
    }

    fn decode<'a>(&self, row: &'a StringRecord) -> RawRow<'a> {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).filter(|c| !c.is_empty());
        let number = |idx: Option<usize>| cell(idx).and_then(|c| c.parse::<f64>().ok());

        RawRow {
            mmsi: cell(self.mmsi).and_then(parse_mmsi),
            latitude: number(self.latitude),
            longitude: number(self.longitude),
            timestamp: cell(self.timestamp),
            speed: number(self.speed),
            course: number(self.course),
            navigation_status: cell(self.navigation_status),
        }
    }
}

/// Vessel identifier, as an integer or an integral float such as `366999.0`.
pub(crate) fn parse_mmsi(cell: &str) -> Option<u64> {
    if let Ok(id) = cell.parse::<u64>() {
        return Some(id);
    }

    cell.parse::<f64>()
        .ok()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
        .map(|f| f as u64)
}

impl RawTable {
    pub fn from_reader<T>(mut rdr: Reader<T>) -> Result<Self, csv::Error>
    where
        T: Read,
    {
        let mut headers = rdr.headers()?.clone();
        headers.trim();

        let mut rows = vec![];
        for row in rdr.records() {
            let mut rec = row?;
            rec.trim();
            rows.push(rec);
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path<P>(path: P) -> Result<Self, csv::Error>
    where
        P: AsRef<Path>,
    {
        let rdr = ReaderBuilder::new().flexible(true).from_path(path)?;

        Self::from_reader(rdr)
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Required columns absent from the header, in canonical order.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !self.headers.iter().any(|h| h == *col))
            .collect()
    }

    /// Distinct vessel identifiers, in order of first appearance.
    pub fn vessel_ids(&self) -> Vec<u64> {
        let idx = match self.headers.iter().position(|h| h == MMSI) {
            Some(i) => i,
            None => return vec![],
        };

        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.get(idx))
            .filter_map(parse_mmsi)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub(crate) fn decoded_rows(&self) -> impl Iterator<Item = RawRow<'_>> + '_ {
        let fields = FieldsIndex::parse_header(&self.headers);

        self.rows.iter().map(move |row| fields.decode(row))
    }
}

#[cfg(test)]
pub mod tests {
    use csv::ReaderBuilder;

    use super::RawTable;

    pub fn table(data: &str) -> Result<RawTable, String> {
        let rdr = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.trim().as_bytes());

        RawTable::from_reader(rdr).map_err(|e| e.to_string())
    }

    #[test]
    fn load() -> Result<(), String> {
        let data = "
            MMSI, Latitude, Longitude, Timestamp, Speed
            100, 10.0, 20.0, 1000, 12.5
            200, 11.0, 21.0, 1500
        ";
        let table = table(data)?;

        assert_eq!(2, table.len());
        assert_eq!(Some("Latitude"), table.headers().get(1));
        assert!(table.missing_columns().is_empty());

        let rows: Vec<_> = table.decoded_rows().collect();
        assert_eq!(Some(100), rows[0].mmsi);
        assert_eq!(Some(12.5), rows[0].speed);
        assert_eq!(Some("1500"), rows[1].timestamp);
        assert_eq!(None, rows[1].speed);
        assert_eq!(None, rows[1].course);

        Ok(())
    }

    #[test]
    fn invalid_numbers_are_absent() -> Result<(), String> {
        let data = "
            MMSI,Latitude,Longitude,Timestamp,Course
            abc,north,20.0,1000,fast
        ";
        let table = table(data)?;

        let rows: Vec<_> = table.decoded_rows().collect();
        assert_eq!(None, rows[0].mmsi);
        assert_eq!(None, rows[0].latitude);
        assert_eq!(Some(20.0), rows[0].longitude);
        assert_eq!(None, rows[0].course);

        Ok(())
    }

    #[test]
    fn missing_columns() -> Result<(), String> {
        let partial = table("MMSI,Lat,Longitude\n100,1.0,2.0")?;
        assert_eq!(vec!["Latitude", "Timestamp"], partial.missing_columns());

        // names are case sensitive
        let lowercase = table("mmsi,latitude,longitude,timestamp\n100,1.0,2.0,1000")?;
        assert_eq!(
            vec!["MMSI", "Latitude", "Longitude", "Timestamp"],
            lowercase.missing_columns()
        );

        Ok(())
    }

    #[test]
    fn vessel_ids() -> Result<(), String> {
        let data = "
            MMSI,Latitude,Longitude,Timestamp
            300,1.0,2.0,1000
            100,1.0,2.0,1000
            300,1.0,2.0,2000
            x,1.0,2.0,2000
            200,1.0,2.0,3000
        ";
        let ships = table(data)?;
        assert_eq!(vec![300, 100, 200], ships.vessel_ids());

        let no_mmsi = table("Latitude,Longitude\n1.0,2.0")?;
        assert!(no_mmsi.vessel_ids().is_empty());

        Ok(())
    }

    #[test]
    fn float_mmsi() -> Result<(), String> {
        let data = "
            MMSI,Latitude,Longitude,Timestamp
            366999.0,1.0,2.0,1000
            366999,1.0,2.0,2000
            12.5,1.0,2.0,3000
            -4.0,1.0,2.0,3000
        ";
        let ships = table(data)?;
        assert_eq!(vec![366999], ships.vessel_ids());

        let mmsis: Vec<Option<u64>> = ships.decoded_rows().map(|r| r.mmsi).collect();
        assert_eq!(vec![Some(366999), Some(366999), None, None], mmsis);

        Ok(())
    }

    #[test]
    fn duplicated_columns_use_the_first() -> Result<(), String> {
        let data = "
            MMSI,Latitude,Longitude,Timestamp,Speed,Speed
            1,10.0,20.0,1000,3.5,99
            1,10.1,20.1,2000,,7
        ";
        let dup = table(data)?;

        let speeds: Vec<Option<f64>> = dup.decoded_rows().map(|r| r.speed).collect();
        assert_eq!(vec![Some(3.5), None], speeds);

        Ok(())
    }
}
