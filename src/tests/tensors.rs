// src/tests/tensors.rs

use crate::math::tensor::dense::{row_major_offset, Tensor};

use super::common::approx_eq;

#[test]
fn row_major_layout_matches_from_fn() {
    let t: Tensor<f64> = Tensor::from_fn(vec![2, 3, 4], |idx| (100 * idx[0] + 10 * idx[1] + idx[2]) as f64);
    assert_eq!(t.data.len(), 24);
    assert_eq!(t.shape(), &[2, 3, 4]);
    assert_eq!(t.data[0], 0.0);
    assert_eq!(t.data[1], 1.0);
    assert_eq!(t.data[4], 10.0);
    assert_eq!(t.data[12], 100.0);
    assert_eq!(t.get(&[1, 2, 3]), 123.0);
    assert_eq!(t.index(&[1, 2, 3]), 23);
    assert_eq!(row_major_offset(&[2, 3, 4], &[1, 0, 2]), 14);
}

#[test]
fn set_then_read_back() {
    let mut t: Tensor<f64> = Tensor::new(vec![2, 3]);
    t.set(&[1, 2], 4.5);
    t.set(&[0, 1], -2.0);
    assert_eq!(t.get(&[1, 2]), 4.5);
    assert_eq!(t.get(&[0, 1]), -2.0);
    assert_eq!(t.row(1), &[0.0, 0.0, 4.5]);
}

#[test]
#[should_panic(expected = "out of range")]
fn out_of_range_index_panics() {
    let t: Tensor<f64> = Tensor::new(vec![2, 3]);
    t.get(&[0, 3]);
}

#[test]
#[should_panic(expected = "rank mismatch")]
fn rank_mismatch_panics() {
    let t: Tensor<f64> = Tensor::new(vec![2, 3]);
    t.get(&[1]);
}

#[test]
#[should_panic(expected = "must be > 0")]
fn zero_dimension_rejected() {
    let _t: Tensor<f64> = Tensor::new(vec![3, 0]);
}

#[test]
fn rows_are_disjoint_slabs() {
    let mut t: Tensor<f64> = Tensor::new(vec![3, 2]);
    for (r, row) in t.rows_mut().enumerate() {
        row.iter_mut().for_each(|x| *x = r as f64);
    }
    assert_eq!(t.data, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
    assert_eq!(t.row_len(), 2);
}

#[test]
fn parallel_transforms() {
    let mut a: Tensor<f64> = Tensor::from_fn(vec![4, 5], |idx| (idx[0] * 5 + idx[1]) as f64);
    let b = a.clone();
    a.par_zip_with_inplace(&b, |x, y| 0.5 * x + y);
    a += &b;
    assert!(approx_eq(a.get(&[3, 4]), 2.5 * 19.0, 1e-14));

    a.par_fill(2.0);
    assert!(a.data.iter().all(|&x| x == 2.0));
}

#[test]
#[should_panic(expected = "shape mismatch")]
fn accumulate_requires_equal_shapes() {
    let mut a: Tensor<f64> = Tensor::new(vec![2, 2]);
    let b: Tensor<f64> = Tensor::new(vec![4]);
    a += &b;
}
