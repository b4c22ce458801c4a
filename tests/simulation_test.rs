use std::collections::{BTreeMap, BTreeSet};

use traffic_sim::simulation::scenario::{build_demo_world, DemoConfig};
use traffic_sim::simulation::{
    CarId, IntersectionKind, NodeId, SimWorld, StreetId, MIN_DISTANCE,
};

/// Node 1 is a crossing whose green starts on street 0, so a car arriving on
/// street 1 has to wait for the light to rotate
fn waiting_at_red_world(green_phase: u32) -> SimWorld {
    let mut world = SimWorld::new();
    world.add_intersection(NodeId(0), 0).unwrap();
    world.add_intersection(NodeId(1), green_phase).unwrap();
    world.add_street(NodeId(0), NodeId(1), 10, 1, 40).unwrap();
    world.add_street(NodeId(0), NodeId(1), 100, 1, 40).unwrap();
    world.add_street(NodeId(1), NodeId(0), 100, 1, 40).unwrap();
    assert!(world.is_graph_valid());
    world
}

fn state(world: &SimWorld, id: u32) -> (StreetId, u32, u32) {
    let car = world.car(CarId(id)).unwrap();
    (car.street, car.speed, car.position)
}

#[test]
fn test_single_car_accelerates_and_queues_at_street_end() {
    let mut world = waiting_at_red_world(10);
    world.add_vehicle_at(CarId(0), StreetId(1), 0, 40, 10).unwrap();

    let expected = [(10, 10), (20, 30), (30, 60), (40, 100)];
    for (speed, position) in expected {
        world.tick();
        assert_eq!(state(&world, 0), (StreetId(1), speed, position));
    }

    // red until the light moves on after tick 10
    for _ in 5..=10 {
        world.tick();
        assert_eq!(state(&world, 0), (StreetId(1), 0, 100));
    }

    world.tick();
    assert_eq!(state(&world, 0), (StreetId(2), 10, 10));
    assert_eq!(world.car(CarId(0)).unwrap().turn_index(), 1);
}

#[test]
fn test_roundabout_exits_follow_turn_index() {
    let mut world = SimWorld::new();
    for id in 0..3 {
        world.add_intersection(NodeId(id), 0).unwrap();
    }
    // node 0 has incoming streets 0 and 1, outgoing streets 2 and 3
    world.add_street(NodeId(1), NodeId(0), 20, 1, 40).unwrap();
    world.add_street(NodeId(2), NodeId(0), 20, 1, 40).unwrap();
    world.add_street(NodeId(0), NodeId(1), 20, 1, 40).unwrap();
    world.add_street(NodeId(0), NodeId(2), 20, 1, 40).unwrap();
    // node 1 gets a second exit so its choice depends on the turn index too
    world.add_street(NodeId(1), NodeId(2), 20, 1, 40).unwrap();
    assert!(world.is_graph_valid());

    world.add_vehicle(CarId(0), StreetId(0), 20, 10).unwrap();

    let mut visited = vec![StreetId(0)];
    for _ in 0..60 {
        world.tick();
        let street = world.vehicle_street(CarId(0)).unwrap();
        if visited.last() != Some(&street) {
            visited.push(street);
        }
    }

    // turn 0 at node 0, turn 1 at node 1, turn 2 at node 2, turn 3 at node 0
    assert_eq!(
        &visited[..5],
        &[StreetId(0), StreetId(2), StreetId(4), StreetId(1), StreetId(3)]
    );
}

#[test]
fn test_crossing_holds_car_until_green_rotates() {
    let mut world = SimWorld::new();
    world.add_intersection(NodeId(0), 3).unwrap();
    world.add_intersection(NodeId(1), 0).unwrap();
    world.add_intersection(NodeId(2), 0).unwrap();
    world.add_street(NodeId(1), NodeId(0), 100, 1, 40).unwrap();
    world.add_street(NodeId(2), NodeId(0), 10, 1, 40).unwrap();
    world.add_street(NodeId(0), NodeId(1), 100, 2, 40).unwrap();
    world.add_street(NodeId(0), NodeId(2), 100, 2, 40).unwrap();
    assert!(world.is_graph_valid());

    world.add_vehicle(CarId(0), StreetId(1), 20, 10).unwrap();
    let green = |world: &SimWorld| {
        world
            .road_network
            .intersection(NodeId(0))
            .and_then(|node| node.green_street())
    };

    for _ in 0..2 {
        world.tick();
        assert_eq!(world.vehicle_street(CarId(0)), Some(StreetId(1)));
        assert_eq!(green(&world), Some(StreetId(0)));
    }

    world.tick();
    assert_eq!(world.vehicle_street(CarId(0)), Some(StreetId(1)));
    assert_eq!(world.vehicle_position(CarId(0)), Some(10));
    assert_eq!(green(&world), Some(StreetId(1)));

    world.tick();
    assert_eq!(world.vehicle_street(CarId(0)), Some(StreetId(2)));
}

#[test]
fn test_full_destination_rejects_crossing_car() {
    let mut world = waiting_at_red_world(3);
    // street 2 is the only exit of node 1; keep its entry occupied
    world.add_vehicle_at(CarId(9), StreetId(2), 5, 20, 1).unwrap();
    world.add_vehicle(CarId(0), StreetId(0), 20, 10).unwrap();
    assert_eq!(state(&world, 0), (StreetId(0), 0, 10));

    world.tick();
    assert_eq!(state(&world, 0), (StreetId(0), 0, 10));
    assert_eq!(world.car(CarId(0)).unwrap().turn_index(), 1);
    assert_eq!(state(&world, 9), (StreetId(2), 1, 6));

    world.tick();
    assert_eq!(state(&world, 0), (StreetId(0), 0, 10));
    assert_eq!(world.car(CarId(0)).unwrap().turn_index(), 2);
    assert!(world.is_graph_valid());
}

#[test]
fn test_loaded_queue_drains_in_order() {
    let mut world = waiting_at_red_world(3);
    for id in 0..4 {
        world.add_vehicle(CarId(id), StreetId(2), 20, 10).unwrap();
    }
    let positions: Vec<u32> = (0..4)
        .filter_map(|id| world.vehicle_position(CarId(id)))
        .collect();
    assert_eq!(positions, vec![100, 90, 80, 70]);

    // node 0 is a roundabout, so the head car leaves on the first tick
    world.tick();
    assert_ne!(world.vehicle_street(CarId(0)), Some(StreetId(2)));
    for id in 1..4 {
        assert_eq!(world.vehicle_street(CarId(id)), Some(StreetId(2)));
    }
    assert!(world.is_graph_valid());
}

/// Simulated worlds keep cars apart, streets within capacity, cars moving
/// forward, and every incoming street of a crossing eventually green
#[test]
fn test_demo_worlds_keep_invariants() {
    for seed in 0..12 {
        let config = DemoConfig {
            intersections: 6,
            max_street_length: 120,
            ..DemoConfig::default()
        };
        let mut world = build_demo_world(seed, config).unwrap();
        let car_count = world.car_count();
        let mut greens: BTreeMap<NodeId, BTreeSet<StreetId>> = BTreeMap::new();

        for tick in 0..200 {
            let before: BTreeMap<CarId, (StreetId, u32, u32)> = world
                .cars()
                .map(|car| (car.id, (car.street, car.position, car.speed)))
                .collect();

            world.tick();

            assert!(world.is_graph_valid(), "seed {seed}, tick {tick}");
            assert_eq!(world.car_count(), car_count);

            for street in world.road_network.streets() {
                let positions: Vec<u32> = street
                    .cars_front_to_back()
                    .into_iter()
                    .map(|(position, _)| position)
                    .collect();
                for pair in positions.windows(2) {
                    assert!(pair[0] - pair[1] >= MIN_DISTANCE);
                }
                assert!(positions.iter().all(|position| *position <= street.length));
            }

            for car in world.cars() {
                assert!(car.speed <= car.desired_speed);
                assert_eq!(
                    world
                        .road_network
                        .street(car.street)
                        .and_then(|street| street.car_at(car.position)),
                    Some(car.id)
                );
                let (street, position, speed) = before[&car.id];
                if street == car.street {
                    assert!(
                        car.position > position || car.speed == 0,
                        "car {} neither advanced nor stopped",
                        car.id
                    );
                    let driven = (speed + car.acceleration).min(car.desired_speed);
                    assert!(
                        car.position >= position && car.position - position <= driven,
                        "car {} moved from {} to {} at speed {}",
                        car.id,
                        position,
                        car.position,
                        driven
                    );
                }
            }

            for node in world.road_network.intersections() {
                if let Some(green) = node.green_street() {
                    greens.entry(node.id).or_default().insert(green);
                }
            }
        }

        for node in world.road_network.intersections() {
            if matches!(node.kind, IntersectionKind::Crossing(_)) {
                let seen: BTreeSet<StreetId> = node.incoming().iter().copied().collect();
                assert_eq!(greens.get(&node.id), Some(&seen), "seed {seed}");
            }
        }
    }
}

#[test]
fn test_same_seed_gives_same_run() {
    let mut a = build_demo_world(5, DemoConfig::default()).unwrap();
    let mut b = build_demo_world(5, DemoConfig::default()).unwrap();
    a.simulate(150);
    b.simulate(150);
    assert_eq!(a.summary(), b.summary());
}
