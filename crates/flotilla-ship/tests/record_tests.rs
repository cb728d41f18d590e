//! Integration tests for saving and loading ships.

use flotilla_ship::prelude::*;

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.insert_outfit(Outfit::new(
        "Cargo Pod",
        Attributes::new()
            .with(StatKey::Mass, 5.0)
            .with(StatKey::CargoSpace, 20.0),
    ));
    catalog.insert_outfit(Outfit::weapon(
        "Laser",
        Attributes::new().with(StatKey::Mass, 2.0),
        WeaponSpec {
            hull_damage: 5.0,
            reload: 10.0,
            ..WeaponSpec::default()
        },
    ));

    let mut tender = ShipModel::new(
        "Tender",
        "Carrier",
        Attributes::new()
            .with(StatKey::Mass, 200.0)
            .with(StatKey::Hull, 2000.0)
            .with(StatKey::Shields, 500.0)
            .with(StatKey::FuelCapacity, 400.0)
            .with(StatKey::RequiredCrew, 12.0),
    );
    tender.fighter_bays = vec![Point::new(0.0, 20.0), Point::new(0.0, -20.0)];
    tender.hardpoints = vec![
        HardpointSpec {
            kind: MountKind::Gun,
            offset: Point::new(-8.0, -30.0),
            outfit: None,
        },
        HardpointSpec {
            kind: MountKind::Gun,
            offset: Point::new(8.0, -30.0),
            outfit: Some("Laser".into()),
        },
    ];
    tender.outfits.insert("Laser".into(), 1);
    tender.explode.insert("large explosion".into(), 6);
    catalog.insert_ship(tender);

    catalog.insert_ship(ShipModel::new(
        "Wasp",
        FIGHTER_CATEGORY,
        Attributes::new()
            .with(StatKey::Mass, 15.0)
            .with(StatKey::Hull, 100.0)
            .with(StatKey::FuelCapacity, 50.0),
    ));
    catalog
}

fn equipped_tender(catalog: &Catalog) -> Ship {
    let mut tender = Ship::from_catalog(catalog, "Tender").unwrap();
    tender.set_name("Endurance");
    tender.set_government(Some("Republic".into()));
    tender.set_system(Some("Sol".into()));
    tender.place(Point::new(120.5, -40.25), Point::ZERO, Angle::from_degrees(-45.0));
    tender.add_outfit("Cargo Pod", 2, catalog);
    tender.cargo_mut().add_commodity("Food", 12);
    tender.transfer_fuel(150.0, None);

    let mut wasp = Ship::from_catalog(catalog, "Wasp").unwrap();
    wasp.set_name("Wasp One");
    wasp.transfer_fuel(20.0, None);
    assert!(tender.add_fighter(Box::new(wasp)).is_ok());
    tender
}

#[test]
fn record_survives_json() {
    let catalog = catalog();
    let tender = equipped_tender(&catalog);
    let record = tender.to_record();

    let json = record.to_json().unwrap();
    let parsed = ShipRecord::from_json_str(&json).unwrap();
    assert_eq!(parsed, record);

    let loaded = Ship::from_record(&parsed, &catalog).unwrap();
    assert_eq!(loaded.to_record(), record);
}

#[test]
fn loading_rebuilds_derived_state() {
    let catalog = catalog();
    let tender = equipped_tender(&catalog);
    let loaded = Ship::from_record(&tender.to_record(), &catalog).unwrap();

    assert_eq!(loaded.name(), "Endurance");
    assert_eq!(loaded.fuel_level(), 250.0);
    assert_eq!(loaded.cargo().size(), 40.0);
    assert_eq!(loaded.cargo().commodity("Food"), 12);
    assert_eq!(loaded.mass(), tender.mass());
    assert_eq!(loaded.armament().count("Laser"), 1);
    assert_eq!(loaded.armament().get(1).unwrap().outfit(), Some("Laser"));
    assert_eq!(loaded.fighter_bays_free(), 1);

    let craft: Vec<&Ship> = loaded.carried_ships().collect();
    assert_eq!(craft.len(), 1);
    assert_eq!(craft[0].name(), "Wasp One");
    assert_eq!(craft[0].fuel_level(), 30.0);
}

#[test]
fn landed_ship_loads_on_the_ground() {
    let catalog = catalog();
    let mut tender = equipped_tender(&catalog);
    tender.set_planet(Some("Earth".into()));

    let loaded = Ship::from_record(&tender.to_record(), &catalog).unwrap();

    assert_eq!(loaded.planet(), Some("Earth"));
    assert_eq!(loaded.zoom(), 0.0);
}

#[test]
fn unknown_docked_model_fails_the_load() {
    let catalog = catalog();
    let mut record = equipped_tender(&catalog).to_record();
    if let Some(craft) = record.fighter_bays[0].ship.as_mut() {
        craft.model = "Hornet".into();
    }

    let err = Ship::from_record(&record, &catalog).unwrap_err();
    assert!(matches!(err, ShipError::UnknownModel(ref name) if name == "Hornet"));
}

#[test]
fn record_with_unaddressable_hardpoints_fails_the_load() {
    let catalog = catalog();
    let mut record = equipped_tender(&catalog).to_record();
    record.hardpoints = vec![
        HardpointSpec {
            kind: MountKind::Gun,
            offset: Point::ZERO,
            outfit: None,
        };
        Command::MAX_HARDPOINTS + 1
    ];

    let err = Ship::from_record(&record, &catalog).unwrap_err();
    assert!(matches!(err, ShipError::TooManyHardpoints { count: 65, .. }));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = ShipRecord::from_json_str("{\"model\": 3}").unwrap_err();
    assert!(matches!(err, ShipError::Parse(_)));
}
