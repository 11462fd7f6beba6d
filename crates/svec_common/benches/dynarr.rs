use std::vec::Vec;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use svec_common::{collections::*, dynarr};

fn dynarr_new(c: &mut Criterion) {
    c.bench_function("DynArr::new", |b| b.iter(|| {
        DynArr::<u32>::new()
    }));
    c.bench_function("Vec::new", |b| b.iter(|| {
        Vec::<u32>::new()
    }));
    c.bench_function("DynArr::with_reserve_hint(64)", |b| b.iter(|| {
        DynArr::<u32>::with_reserve_hint(make_reserve_hint(64))
    }));
    c.bench_function("Vec::with_capacity(64)", |b| b.iter(|| {
        Vec::<u32>::with_capacity(64)
    }));
}

fn dynarr_push(c: &mut Criterion) {
    c.bench_function("DynArr::push(100) no reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("DynArr::push(100) reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        arr.reserve(100);
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("Vec::push(100) no reserve", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("Vec::push(100) reserve", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        arr.reserve(100);
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
}

fn dynarr_insert_erase(c: &mut Criterion) {
    c.bench_function("DynArr::insert(100) front", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        for i in 0..100 {
            arr.insert(0, i);
        }
        arr
    }));
    c.bench_function("Vec::insert(100) front", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        for i in 0..100 {
            arr.insert(0, i);
        }
        arr
    }));

    let arr = dynarr![5u32; 100];
    c.bench_function("DynArr::erase(100) front", |b| b.iter(|| {
        let mut arr = arr.clone();
        while !arr.is_empty() {
            black_box(arr.erase(0));
        }
        arr
    }));
    let vbuf = vec![5u32; 100];
    c.bench_function("Vec::remove(100) front", |b| b.iter(|| {
        let mut arr = vbuf.clone();
        while !arr.is_empty() {
            black_box(arr.remove(0));
        }
        arr
    }));
}

fn dynarr_resize(c: &mut Criterion) {
    c.bench_function("DynArr::resize(1000)", |b| b.iter(|| {
        let mut arr = DynArr::<u64>::new();
        arr.resize(black_box(1000));
        arr
    }));
    c.bench_function("Vec::resize(1000)", |b| b.iter(|| {
        let mut arr = Vec::<u64>::new();
        arr.resize(black_box(1000), 0);
        arr
    }));
}

fn dynarr_index(c: &mut Criterion) {
    let arr = dynarr![5; 100];
    c.bench_function("DynArr::index(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(arr[i]);
        }
    }));
    c.bench_function("DynArr::at(100)", |b| b.iter(|| {
        for i in 0..100 {
            _ = black_box(arr.at(i));
        }
    }));

    let vbuf = vec![5; 100];
    c.bench_function("Vec::index(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(vbuf[i]);
        }
    }));
}

criterion_group!(dynarr,
    dynarr_new,
    dynarr_push,
    dynarr_insert_erase,
    dynarr_resize,
    dynarr_index
);
criterion_main!(dynarr);
