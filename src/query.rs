//! Filter state and its bidirectional mapping to URL query strings.
//!
//! Decoding substitutes the default for anything missing, malformed, or
//! outside the allow-lists; encoding emits only non-default parameters
//! in a stable order, so encoded URLs stay minimal and canonical.

use serde::{Deserialize, Serialize};

use crate::models::RecordStatus;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 5;
const ALL_DEPARTMENTS: &str = "all";

/// Status filter: a concrete status or no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    All,
    Only(RecordStatus),
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.as_str(),
        }
    }

    /// Unrecognized values fall back to `All`.
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            StatusFilter::All
        } else {
            RecordStatus::parse(value)
                .map(StatusFilter::Only)
                .unwrap_or(StatusFilter::All)
        }
    }
}

/// Allow-listed sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Id,
    PatientId,
    PatientName,
    DateOfBirth,
    Diagnosis,
    AdmissionDate,
    DischargeDate,
    Status,
    Department,
}

impl SortField {
    pub const ALL: [SortField; 9] = [
        SortField::Id,
        SortField::PatientId,
        SortField::PatientName,
        SortField::DateOfBirth,
        SortField::Diagnosis,
        SortField::AdmissionDate,
        SortField::DischargeDate,
        SortField::Status,
        SortField::Department,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::PatientId => "patientId",
            SortField::PatientName => "patientName",
            SortField::DateOfBirth => "dateOfBirth",
            SortField::Diagnosis => "diagnosis",
            SortField::AdmissionDate => "admissionDate",
            SortField::DischargeDate => "dischargeDate",
            SortField::Status => "status",
            SortField::Department => "department",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// One logical query against the records list.
///
/// `limit` is a request parameter only; it never appears in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub status: StatusFilter,
    pub department: String,
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            department: ALL_DEPARTMENTS.to_string(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: SortField::Id,
            sort_order: SortOrder::Asc,
        }
    }
}

impl FilterState {
    /// Decode a query string, defaulting every unrecognized value.
    pub fn from_query(query: &str) -> Self {
        let mut filters = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(raw);
            match key {
                "search" => filters.search = value,
                "status" => filters.status = StatusFilter::parse(&value),
                "department" => {
                    if !value.is_empty() {
                        filters.department = value;
                    }
                }
                "page" => {
                    filters.page = value
                        .parse::<u32>()
                        .ok()
                        .filter(|p| *p >= 1)
                        .unwrap_or(DEFAULT_PAGE)
                }
                "sortBy" => {
                    if let Some(field) = SortField::parse(&value) {
                        filters.sort_by = field;
                    }
                }
                "sortOrder" => {
                    if let Some(order) = SortOrder::parse(&value) {
                        filters.sort_order = order;
                    }
                }
                _ => {}
            }
        }

        filters
    }

    /// Encode as a minimal canonical query string: only parameters that
    /// differ from their default, in a fixed order, no leading `?`.
    pub fn to_query(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        if self.status != StatusFilter::All {
            params.push(("status", self.status.as_str().to_string()));
        }
        if self.department != ALL_DEPARTMENTS {
            params.push(("department", self.department.clone()));
        }
        if self.page != DEFAULT_PAGE {
            params.push(("page", self.page.to_string()));
        }
        if self.sort_by != SortField::Id {
            params.push(("sortBy", self.sort_by.as_str().to_string()));
        }
        if self.sort_order != SortOrder::Asc {
            params.push(("sortOrder", self.sort_order.as_str().to_string()));
        }

        render_query(&params)
    }

    /// Query string for the list request itself. Unlike [`to_query`],
    /// pagination and sorting are always explicit so the backend never
    /// has to guess, while `status`/`department` are still omitted when
    /// they mean "no restriction".
    ///
    /// [`to_query`]: FilterState::to_query
    pub fn to_request_query(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        if self.status != StatusFilter::All {
            params.push(("status", self.status.as_str().to_string()));
        }
        if self.department != ALL_DEPARTMENTS {
            params.push(("department", self.department.clone()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("limit", self.limit.to_string()));
        params.push(("sortBy", self.sort_by.as_str().to_string()));
        params.push(("sortOrder", self.sort_order.as_str().to_string()));

        render_query(&params)
    }
}

fn render_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode a query component. Unreserved characters pass through;
/// everything else is encoded byte-wise, including spaces as `%20`.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Percent-decode a query component; `+` means space, malformed escapes
/// are kept literally.
fn decode_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
                i += 3;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_state_encodes_to_empty_string() {
        assert_eq!(FilterState::default().to_query(), "");
    }

    #[test]
    fn empty_query_decodes_to_defaults() {
        assert_eq!(FilterState::from_query(""), FilterState::default());
        assert_eq!(FilterState::from_query("?"), FilterState::default());
    }

    #[test]
    fn bogus_status_and_page_fall_back_to_defaults() {
        let filters = FilterState::from_query("status=Bogus&page=abc");
        assert_eq!(filters.status, StatusFilter::All);
        assert_eq!(filters.page, DEFAULT_PAGE);
    }

    #[test]
    fn zero_and_negative_pages_clamp_to_one() {
        assert_eq!(FilterState::from_query("page=0").page, 1);
        assert_eq!(FilterState::from_query("page=-3").page, 1);
    }

    #[test]
    fn unknown_sort_values_fall_back() {
        let filters = FilterState::from_query("sortBy=rowid&sortOrder=sideways");
        assert_eq!(filters.sort_by, SortField::Id);
        assert_eq!(filters.sort_order, SortOrder::Asc);
    }

    #[test]
    fn encode_emits_non_defaults_in_stable_order() {
        let filters = FilterState {
            search: "flu".to_string(),
            status: StatusFilter::Only(RecordStatus::Pending),
            department: "Cardiology".to_string(),
            page: 3,
            sort_by: SortField::PatientName,
            sort_order: SortOrder::Desc,
            ..FilterState::default()
        };
        assert_eq!(
            filters.to_query(),
            "search=flu&status=Pending&department=Cardiology&page=3&sortBy=patientName&sortOrder=desc"
        );
    }

    #[test]
    fn encode_trims_search_and_omits_it_when_blank() {
        let filters = FilterState {
            search: "   ".to_string(),
            ..FilterState::default()
        };
        assert_eq!(filters.to_query(), "");

        let filters = FilterState {
            search: "  ward 3  ".to_string(),
            ..FilterState::default()
        };
        assert_eq!(filters.to_query(), "search=ward%203");
    }

    #[test]
    fn department_with_spaces_round_trips() {
        let filters = FilterState {
            department: "Intensive Care".to_string(),
            ..FilterState::default()
        };
        let encoded = filters.to_query();
        assert_eq!(encoded, "department=Intensive%20Care");
        assert_eq!(FilterState::from_query(&encoded), filters);
    }

    #[test]
    fn plus_decodes_as_space() {
        let filters = FilterState::from_query("search=ward+3");
        assert_eq!(filters.search, "ward 3");
    }

    #[test]
    fn empty_department_value_keeps_default() {
        let filters = FilterState::from_query("department=");
        assert_eq!(filters.department, "all");
    }

    #[test]
    fn request_query_always_carries_paging_and_sort() {
        let filters = FilterState::default();
        assert_eq!(
            filters.to_request_query(),
            "page=1&limit=5&sortBy=id&sortOrder=asc"
        );
    }

    fn canonical_filters() -> impl Strategy<Value = FilterState> {
        let search = prop_oneof![
            Just(String::new()),
            "[A-Za-z0-9]{1,8}",
            "[A-Za-z0-9]{1,5} [A-Za-z0-9]{1,5}",
        ];
        let status = prop_oneof![
            Just(StatusFilter::All),
            proptest::sample::select(RecordStatus::ALL.to_vec()).prop_map(StatusFilter::Only),
        ];
        let department = prop_oneof![
            Just("all".to_string()),
            "[A-Za-z]{2,10}",
            "[A-Za-z]{2,6} [A-Za-z]{2,6}",
        ];
        let sort_by = proptest::sample::select(SortField::ALL.to_vec());
        let sort_order = prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)];

        (search, status, department, 1u32..50, sort_by, sort_order).prop_map(
            |(search, status, department, page, sort_by, sort_order)| FilterState {
                search,
                status,
                department,
                page,
                sort_by,
                sort_order,
                ..FilterState::default()
            },
        )
    }

    proptest! {
        #[test]
        fn decode_is_left_inverse_of_encode(filters in canonical_filters()) {
            let round_tripped = FilterState::from_query(&filters.to_query());
            prop_assert_eq!(round_tripped, filters);
        }

        #[test]
        fn decode_never_panics_on_arbitrary_input(query in "\\PC{0,60}") {
            let _ = FilterState::from_query(&query);
        }
    }
}
