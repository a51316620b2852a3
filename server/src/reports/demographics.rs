use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::User;
use crate::store::eq_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    Under18,
    From18To27,
    From27To40,
    From40To55,
    Over55,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::Under18,
        AgeBracket::From18To27,
        AgeBracket::From27To40,
        AgeBracket::From40To55,
        AgeBracket::Over55,
    ];

    /// Lower bounds are inclusive: a volunteer turns 18 and moves up that day.
    pub fn for_age(age: i32) -> Self {
        match age {
            i32::MIN..=17 => AgeBracket::Under18,
            18..=26 => AgeBracket::From18To27,
            27..=39 => AgeBracket::From27To40,
            40..=54 => AgeBracket::From40To55,
            _ => AgeBracket::Over55,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::Under18 => "Under 18",
            AgeBracket::From18To27 => "18 to 27",
            AgeBracket::From27To40 => "27 to 40",
            AgeBracket::From40To55 => "40 to 55",
            AgeBracket::Over55 => "Over 55",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenderFilter {
    #[default]
    All,
    Only(String),
}

impl GenderFilter {
    /// `None`, blank and "All" (any case) mean no filter.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => GenderFilter::All,
            Some(v) if v.eq_ignore_ascii_case("all") => GenderFilter::All,
            Some(v) => GenderFilter::Only(v.to_string()),
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        match self {
            GenderFilter::All => true,
            GenderFilter::Only(gender) => user
                .gender
                .as_deref()
                .is_some_and(|g| eq_ignore_case(g, gender)),
        }
    }

    pub fn as_gender(&self) -> Option<&str> {
        match self {
            GenderFilter::All => None,
            GenderFilter::Only(gender) => Some(gender.as_str()),
        }
    }

    pub fn label(&self) -> &str {
        self.as_gender().unwrap_or("All")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketCount {
    pub bracket: AgeBracket,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub gender: String,
    pub total: usize,
    pub brackets: Vec<BracketCount>,
}

impl Demographics {
    pub fn count(&self, bracket: AgeBracket) -> usize {
        self.brackets[bracket.index()].count
    }
}

/// Whole years from `birth` to `today` by calendar-year subtraction.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

/// Count users per age bracket. Users without a birth date, or outside the
/// gender filter, are left out rather than guessed into a bracket.
pub fn bucket_users<'a, I>(users: I, gender: &GenderFilter, today: NaiveDate) -> Demographics
where
    I: IntoIterator<Item = &'a User>,
{
    let mut counts = [0usize; 5];
    for user in users.into_iter().filter(|u| gender.matches(u)) {
        if let Some(birth) = user.birth_date {
            counts[AgeBracket::for_age(age_on(birth, today)).index()] += 1;
        }
    }

    Demographics {
        gender: gender.label().to_string(),
        total: counts.iter().sum(),
        brackets: AgeBracket::ALL
            .iter()
            .map(|&bracket| BracketCount {
                bracket,
                label: bracket.label(),
                count: counts[bracket.index()],
            })
            .collect(),
    }
}
