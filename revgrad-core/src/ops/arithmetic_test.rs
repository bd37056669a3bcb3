use super::*;
use crate::tensor::create;

fn tensor(g: &mut Graph, dims: Vec<usize>, values: &[f32]) -> Tensor {
    Tensor::from_values(g, Shape::new(dims), values).expect("test tensor creation failed")
}

#[test]
fn add_same_shape() {
    let mut g = Graph::new();
    let a = tensor(&mut g, vec![2, 2], &[1., 2., 3., 4.]);
    let b = tensor(&mut g, vec![2, 2], &[5., 6., 7., 8.]);
    let c = add_op(&mut g, &a, &b).unwrap();
    assert_eq!(c.values(&g), vec![6., 8., 10., 12.]);
    assert_eq!(c.shape(), &Shape::new(vec![2, 2]));
}

#[test]
fn add_shape_mismatch() {
    let mut g = Graph::new();
    let a = tensor(&mut g, vec![2, 2], &[1., 2., 3., 4.]);
    let b = tensor(&mut g, vec![2, 3], &[0.; 6]);
    match add_op(&mut g, &a, &b) {
        Err(RevGradError::ShapeMismatch { lhs, rhs, .. }) => {
            assert_eq!(lhs, vec![2, 2]);
            assert_eq!(rhs, vec![2, 3]);
        }
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }
}

#[test]
fn add_backward_unit_grads() {
    let mut g = Graph::new();
    let a = tensor(&mut g, vec![3], &[1., 2., 3.]);
    let b = tensor(&mut g, vec![3], &[4., 5., 6.]);
    let c = add_op(&mut g, &a, &b).unwrap();
    c.backward(&mut g);
    assert_eq!(a.grads(&g), vec![1., 1., 1.]);
    assert_eq!(b.grads(&g), vec![1., 1., 1.]);
}

#[test]
fn mul_backward_swaps_operands() {
    let mut g = Graph::new();
    let a = tensor(&mut g, vec![2], &[2., 3.]);
    let b = tensor(&mut g, vec![2], &[5., 7.]);
    let c = mul_op(&mut g, &a, &b).unwrap();
    assert_eq!(c.values(&g), vec![10., 21.]);
    c.backward(&mut g);
    assert_eq!(a.grads(&g), vec![5., 7.]);
    assert_eq!(b.grads(&g), vec![2., 3.]);
}

#[test]
fn div_backward() {
    let mut g = Graph::new();
    let a = tensor(&mut g, vec![1], &[2.]);
    let b = tensor(&mut g, vec![1], &[4.]);
    let c = div_op(&mut g, &a, &b).unwrap();
    c.backward(&mut g);
    assert_eq!(a.grads(&g), vec![0.25]);
    assert_eq!(b.grads(&g), vec![-2. / 16.]);
}

#[test]
fn broadcast_row_vector_over_matrix() {
    let mut g = Graph::new();
    let a = tensor(&mut g, vec![2, 3], &[1., 2., 3., 4., 5., 6.]);
    let b = tensor(&mut g, vec![3], &[10., 20., 30.]);
    let c = add_op(&mut g, &a, &b).unwrap();
    assert_eq!(c.shape(), &Shape::new(vec![2, 3]));
    assert_eq!(c.values(&g), vec![11., 22., 33., 14., 25., 36.]);
    c.backward(&mut g);
    // Each row-vector element contributed to one element per row.
    assert_eq!(b.grads(&g), vec![2., 2., 2.]);
    assert_eq!(a.grads(&g), vec![1.; 6]);
}

#[test]
fn broadcast_column_vector_over_matrix() {
    let mut g = Graph::new();
    let a = tensor(&mut g, vec![2, 3], &[1., 2., 3., 4., 5., 6.]);
    let b = tensor(&mut g, vec![2, 1], &[100., 200.]);
    let c = add_op(&mut g, &a, &b).unwrap();
    assert_eq!(c.values(&g), vec![101., 102., 103., 204., 205., 206.]);
    c.backward(&mut g);
    assert_eq!(b.grads(&g), vec![3., 3.]);
}

#[test]
fn broadcast_scalar() {
    let mut g = Graph::new();
    let a = tensor(&mut g, vec![2, 2], &[1., 2., 3., 4.]);
    let s = create::full(&mut g, Shape::new(vec![1]), 10.0);
    let c = mul_op(&mut g, &a, &s).unwrap();
    assert_eq!(c.values(&g), vec![10., 20., 30., 40.]);
    c.backward(&mut g);
    assert_eq!(s.grads(&g), vec![10.]);
}
