use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hbnb::models::{Amenity, City, Place, State};
use hbnb::search::{filter_places, PlacesSearchRequest};
use hbnb::storage::{FileStorage, Storage};
use std::hint::black_box;
use tempfile::TempDir;
use tokio::runtime::Runtime;

struct Catalog {
    states: Vec<State>,
    cities: Vec<City>,
    amenities: Vec<Amenity>,
    places: Vec<Place>,
}

// 10 states with 10 cities each, places spread evenly, every place
// linked to a rotating pair of 20 amenities
fn build_catalog(places: usize) -> Catalog {
    let states: Vec<State> = (0..10).map(|i| State::new(format!("State {}", i))).collect();
    let cities: Vec<City> = states
        .iter()
        .flat_map(|s| (0..10).map(move |i| City::new(&s.id, format!("City {}", i))))
        .collect();
    let amenities: Vec<Amenity> = (0..20).map(|i| Amenity::new(format!("Amenity {}", i))).collect();
    let places = (0..places)
        .map(|i| {
            let city = &cities[i % cities.len()];
            let mut place = Place::new(&city.id, "bench-user", format!("Place {}", i));
            place.link_amenity(&amenities[i % amenities.len()].id);
            place.link_amenity(&amenities[(i + 1) % amenities.len()].id);
            place
        })
        .collect();
    Catalog { states, cities, amenities, places }
}

fn benchmark_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_places");
    for size in [100usize, 1_000, 10_000] {
        let catalog = build_catalog(size);
        let by_state = PlacesSearchRequest {
            states: Some(catalog.states[..3].iter().map(|s| s.id.clone()).collect()),
            ..Default::default()
        };
        let by_amenities = PlacesSearchRequest {
            amenities: Some(vec![catalog.amenities[0].id.clone(), catalog.amenities[1].id.clone()]),
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::new("states", size), &catalog, |b, cat| {
            b.iter(|| {
                filter_places(black_box(&by_state), cat.places.clone(), &cat.cities, &cat.amenities)
            })
        });
        group.bench_with_input(BenchmarkId::new("amenities", size), &catalog, |b, cat| {
            b.iter(|| {
                filter_places(black_box(&by_amenities), cat.places.clone(), &cat.cities, &cat.amenities)
            })
        });
    }
    group.finish();
}

fn benchmark_file_save(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let temp_dir = TempDir::new().unwrap();
    let catalog = build_catalog(1_000);
    let storage = rt.block_on(async {
        let storage = FileStorage::open(temp_dir.path().join("file.json")).await.unwrap();
        for place in catalog.places {
            storage.new(place.into()).await.unwrap();
        }
        storage
    });

    c.bench_function("file_storage_save_1000_places", |b| {
        b.iter(|| rt.block_on(async { storage.save().await.unwrap() }))
    });
}

criterion_group!(benches, benchmark_filter, benchmark_file_save);
criterion_main!(benches);
