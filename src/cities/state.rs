//! State of the cities screen.
//!
//! `CityAdmin` owns the last-fetched lists, the draft being edited and the
//! form mode. It never performs I/O: every remote call is returned as a
//! [`Command`] for the caller to run, and every result is fed back through
//! [`CityAdmin::apply`] together with the generation it was issued under.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::api::{City, Country, NewCity};

/// Mount counter. Results issued under an older generation are discarded.
pub type Generation = u64;

/// Which form, if any, is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    /// Only the table is shown.
    #[default]
    List,
    /// The shared form creates a new city on submit.
    Adding,
    /// The shared form overwrites the city with this id on submit.
    Editing { id: i64 },
}

impl FormMode {
    /// Whether a form is open.
    pub fn is_form_open(&self) -> bool {
        !matches!(self, FormMode::List)
    }

    /// Heading shown above the form.
    pub fn title(&self) -> Option<&'static str> {
        match self {
            FormMode::List => None,
            FormMode::Adding => Some("Add new city"),
            FormMode::Editing { .. } => Some("Edit city"),
        }
    }
}

/// Transient copy of the city being added or edited.
///
/// `id` and `country_id` use 0 for "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityDraft {
    pub id: i64,
    pub name: String,
    pub detailed_name: String,
    pub iata_code: String,
    pub country_id: i64,
}

impl CityDraft {
    /// Copy the displayed values of a row.
    pub fn from_city(city: &City) -> Self {
        Self {
            id: city.id.unwrap_or(0),
            name: city.name.clone(),
            detailed_name: city.detailed_name.clone(),
            iata_code: city.iata_code.clone(),
            country_id: city.country_id,
        }
    }

    fn to_new_city(&self) -> NewCity {
        NewCity {
            name: self.name.clone(),
            detailed_name: self.detailed_name.clone(),
            iata_code: self.iata_code.clone(),
            country_id: self.country_id,
        }
    }

    fn to_city(&self) -> City {
        City {
            id: Some(self.id),
            name: self.name.clone(),
            detailed_name: self.detailed_name.clone(),
            iata_code: self.iata_code.clone(),
            country_id: self.country_id,
        }
    }
}

/// A remote call requested by the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadCities,
    LoadCountries,
    CreateCity(NewCity),
    UpdateCity(City),
    DeleteCity(i64),
}

/// A successful remote result, fed back into the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    CitiesLoaded(Vec<City>),
    CountriesLoaded(Vec<Country>),
    /// A create, update or delete went through.
    Mutated,
}

/// The cities screen model.
#[derive(Debug, Default)]
pub struct CityAdmin {
    cities: Vec<City>,
    countries: Vec<Country>,
    country_names: HashMap<i64, String>,
    draft: CityDraft,
    mode: FormMode,
    generation: Generation,
    mounted: bool,
    in_flight: usize,
}

impl CityAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Activate the screen and request both lists.
    ///
    /// Starts a new generation, so anything still in flight from a previous
    /// mount is ignored when it lands.
    pub fn mount(&mut self) -> Vec<Command> {
        self.discard_state();
        self.generation += 1;
        self.mounted = true;
        debug!(generation = self.generation, "Cities screen mounted");
        self.track(vec![Command::LoadCities, Command::LoadCountries])
    }

    /// Tear the screen down. Late results for this mount are dropped.
    pub fn unmount(&mut self) {
        if self.mounted {
            debug!(generation = self.generation, "Cities screen unmounted");
        }
        self.discard_state();
        self.mounted = false;
    }

    fn discard_state(&mut self) {
        self.cities = Vec::new();
        self.countries = Vec::new();
        self.country_names = HashMap::new();
        self.draft = CityDraft::default();
        self.mode = FormMode::List;
        self.in_flight = 0;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether any request issued under the current mount is unsettled.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    fn track(&mut self, commands: Vec<Command>) -> Vec<Command> {
        self.in_flight += commands.len();
        commands
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.mounted && generation == self.generation
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Cities in server order.
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Display name of a country, from the last loaded country list.
    pub fn country_name(&self, country_id: i64) -> Option<&str> {
        self.country_names.get(&country_id).map(String::as_str)
    }

    pub fn draft(&self) -> &CityDraft {
        &self.draft
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    // ------------------------------------------------------------------
    // Draft edits
    // ------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_detailed_name(&mut self, detailed_name: impl Into<String>) {
        self.draft.detailed_name = detailed_name.into();
    }

    pub fn set_iata_code(&mut self, iata_code: impl Into<String>) {
        self.draft.iata_code = iata_code.into();
    }

    pub fn set_country_id(&mut self, country_id: i64) {
        self.draft.country_id = country_id;
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Back to the plain list with an empty draft.
    fn reset(&mut self) {
        self.draft = CityDraft::default();
        self.mode = FormMode::List;
    }

    /// Open the add form with an empty draft. Leaves any edit in progress.
    pub fn open_add(&mut self) {
        self.reset();
        self.mode = FormMode::Adding;
        trace!("Add form opened");
    }

    /// Open the edit form pre-filled with the row's displayed values.
    pub fn open_edit(&mut self, city: &City) {
        self.reset();
        self.draft = CityDraft::from_city(city);
        self.mode = FormMode::Editing { id: self.draft.id };
        trace!(id = self.draft.id, "Edit form opened");
    }

    /// Submit the shared form.
    ///
    /// The form resets to the list before the request is issued; the caller
    /// runs the returned command. Returns `None` when no form is open.
    pub fn submit(&mut self) -> Option<Command> {
        let command = match self.mode {
            FormMode::List => return None,
            FormMode::Adding => Command::CreateCity(self.draft.to_new_city()),
            FormMode::Editing { .. } => Command::UpdateCity(self.draft.to_city()),
        };
        self.reset();
        debug!(?command, "Form submitted");
        self.track(vec![command]).pop()
    }

    /// Delete a row. The form is left as it is.
    pub fn delete(&mut self, id: i64) -> Command {
        debug!(id, "Delete requested");
        self.in_flight += 1;
        Command::DeleteCity(id)
    }

    /// Reload both lists.
    pub fn reload(&mut self) -> Vec<Command> {
        self.track(vec![Command::LoadCities, Command::LoadCountries])
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Apply a successful result issued under `generation`.
    ///
    /// Returns follow-up commands (a list reload after a mutation). Results
    /// from a retired generation or arriving after unmount change nothing.
    pub fn apply(&mut self, generation: Generation, outcome: Outcome) -> Vec<Command> {
        if !self.is_current(generation) {
            debug!(
                generation,
                current = self.generation,
                mounted = self.mounted,
                "Discarding stale result"
            );
            return Vec::new();
        }
        self.settle();

        match outcome {
            Outcome::CitiesLoaded(cities) => {
                debug!(count = cities.len(), "Cities replaced");
                self.cities = cities;
                Vec::new()
            }
            Outcome::CountriesLoaded(countries) => {
                debug!(count = countries.len(), "Countries replaced");
                self.country_names = map_country_names(&countries);
                self.countries = countries;
                Vec::new()
            }
            Outcome::Mutated => self.track(vec![Command::LoadCities]),
        }
    }

    /// Note that a request issued under `generation` failed.
    ///
    /// Data and form state stay as they are; reporting is up to the caller.
    pub fn request_failed(&mut self, generation: Generation) {
        if self.is_current(generation) {
            self.settle();
        } else {
            warn!(generation, "Failure from a retired generation");
        }
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

/// Build the id -> name lookup. Later duplicates overwrite earlier ones.
fn map_country_names(countries: &[Country]) -> HashMap<i64, String> {
    let mut names = HashMap::with_capacity(countries.len());
    for country in countries {
        names.insert(country.id, country.name.clone());
    }
    names
}
