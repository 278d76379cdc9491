use super::{PersonRepository, Repository};
use crate::error::StoreError;
use crate::graph::{Attr, Delta, Filter, GraphStore, Query, RecordKind, Row};
use crate::ids::{FamilyId, PersonId};
use crate::mortality::MAX_HEALTH;
use crate::types::{Gender, Person, Profession};

const PERSON_ATTRS: [Attr; 8] = [
    Attr::Gender,
    Attr::Age,
    Attr::Alive,
    Attr::Health,
    Attr::Profession,
    Attr::Family,
    Attr::FirstName,
    Attr::LastName,
];

fn persons() -> Query {
    Query::of(RecordKind::Person)
        .select_all(&PERSON_ATTRS)
        .optional(Attr::Partner)
        .optional(Attr::Mother)
        .optional(Attr::Father)
}

fn living_persons() -> Query {
    persons().filter(Filter::eq(Attr::Alive, true))
}

fn opt_person(row: &Row, attr: Attr) -> Result<Option<PersonId>, StoreError> {
    row.opt_node(attr)?.map(PersonId::from_node).transpose()
}

fn to_u32(row: &Row, attr: Attr) -> Result<u32, StoreError> {
    let v = row.int(attr)?;
    u32::try_from(v).map_err(|_| StoreError::TypeMismatch {
        node: row.subject,
        attr,
        expected: "non-negative int",
        found: v.to_string(),
    })
}

impl TryFrom<&Row> for Person {
    type Error = StoreError;

    fn try_from(row: &Row) -> Result<Self, StoreError> {
        Ok(Person {
            id: PersonId::from_node(row.subject()?)?,
            gender: Gender::from_code(row.text(Attr::Gender)?)?,
            age: to_u32(row, Attr::Age)?,
            alive: row.bool(Attr::Alive)?,
            health: row.int(Attr::Health)?.clamp(0, MAX_HEALTH.into()) as i32,
            profession: Profession::from_name(row.text(Attr::Profession)?)?,
            family: FamilyId::from_node(row.node(Attr::Family)?)?,
            partner: opt_person(row, Attr::Partner)?,
            mother: opt_person(row, Attr::Mother)?,
            father: opt_person(row, Attr::Father)?,
            first_name: row.text(Attr::FirstName)?.to_string(),
            last_name: row.text(Attr::LastName)?.to_string(),
        })
    }
}

impl<S: GraphStore> Repository<S> {
    fn fetch_persons(&self, query: Query) -> Result<Vec<Person>, StoreError> {
        self.store.query(&query)?.iter().map(Person::try_from).collect()
    }
}

impl<S: GraphStore> PersonRepository for Repository<S> {
    fn person(&self, id: PersonId) -> Result<Person, StoreError> {
        self.fetch_persons(persons().subject(id))?
            .pop()
            .ok_or(StoreError::UnknownNode(id.node()))
    }

    fn living(&self) -> Result<Vec<Person>, StoreError> {
        self.fetch_persons(living_persons())
    }

    fn family_members(&self, family: FamilyId) -> Result<Vec<Person>, StoreError> {
        self.fetch_persons(living_persons().filter(Filter::eq(Attr::Family, family.node())))
    }

    fn children_of(&self, mother: PersonId) -> Result<Vec<Person>, StoreError> {
        self.fetch_persons(persons().filter(Filter::eq(Attr::Mother, mother.node())))
    }

    fn unpartnered_adults(&self, min_age: u32) -> Result<Vec<Person>, StoreError> {
        self.fetch_persons(
            living_persons()
                .filter(Filter::Missing(Attr::Partner))
                .filter(Filter::gt(Attr::Age, min_age.into())),
        )
    }

    fn first_names(&self) -> Result<Vec<String>, StoreError> {
        self.store
            .query(&Query::of(RecordKind::Person).select(Attr::FirstName))?
            .iter()
            .map(|row| row.text(Attr::FirstName).map(str::to_string))
            .collect()
    }

    fn create_person(&mut self, p: &Person) -> Result<(), StoreError> {
        let mut delta = Delta::new()
            .create(p.id)
            .insert(p.id, Attr::Gender, p.gender.code())
            .insert(p.id, Attr::Age, p.age)
            .insert(p.id, Attr::Alive, p.alive)
            .insert(p.id, Attr::Health, p.health.clamp(0, MAX_HEALTH))
            .insert(p.id, Attr::Profession, p.profession.name())
            .insert(p.id, Attr::Family, p.family.node())
            .insert(p.id, Attr::FirstName, p.first_name.as_str())
            .insert(p.id, Attr::LastName, p.last_name.as_str());
        if let Some(partner) = p.partner {
            delta = delta
                .insert(p.id, Attr::Partner, partner.node())
                .set(partner, Attr::Partner, p.id.node());
        }
        if let Some(mother) = p.mother {
            delta = delta
                .insert(p.id, Attr::Mother, mother.node())
                .insert(mother, Attr::Child, p.id.node());
        }
        if let Some(father) = p.father {
            delta = delta
                .insert(p.id, Attr::Father, father.node())
                .insert(father, Attr::Child, p.id.node());
        }
        self.store.apply_delta(&delta)
    }

    fn link_child(&mut self, parent: &Person, child: PersonId) -> Result<(), StoreError> {
        let role = match parent.gender {
            Gender::Female => Attr::Mother,
            Gender::Male => Attr::Father,
        };
        self.store.apply_delta(
            &Delta::new()
                .set(child, role, parent.id.node())
                .insert(parent.id, Attr::Child, child.node()),
        )
    }

    fn set_profession(&mut self, id: PersonId, profession: Profession) -> Result<(), StoreError> {
        self.store
            .apply_delta(&Delta::new().set(id, Attr::Profession, profession.name()))
    }

    fn set_health(&mut self, id: PersonId, health: i32) -> Result<(), StoreError> {
        self.store
            .apply_delta(&Delta::new().set(id, Attr::Health, health.clamp(0, MAX_HEALTH)))
    }

    fn kill(&mut self, id: PersonId) -> Result<(), StoreError> {
        self.store.apply_delta(
            &Delta::new()
                .set(id, Attr::Alive, false)
                .set(id, Attr::Health, 0),
        )
    }

    fn partner(&mut self, a: PersonId, b: PersonId) -> Result<(), StoreError> {
        self.store.apply_delta(
            &Delta::new()
                .set(a, Attr::Partner, b.node())
                .set(b, Attr::Partner, a.node()),
        )
    }

    fn age_all_living(&mut self) -> Result<usize, StoreError> {
        let rows = self.store.query(
            &Query::of(RecordKind::Person)
                .select(Attr::Age)
                .filter(Filter::eq(Attr::Alive, true)),
        )?;
        let mut delta = Delta::new();
        for row in &rows {
            delta = delta.set(row.subject()?, Attr::Age, row.int(Attr::Age)? + 1);
        }
        if !delta.is_empty() {
            self.store.apply_delta(&delta)?;
        }
        Ok(rows.len())
    }
}
