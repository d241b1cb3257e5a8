/// 计算两个等长向量的平方 L2 距离
#[inline(always)]
pub fn l2_squared(va: &[f32], vb: &[f32]) -> f32 {
    debug_assert_eq!(va.len(), vb.len());
    // 分成 4 路累加，便于编译器向量化
    let mut acc = [0f32; 4];
    let (ca, ra) = va.as_chunks::<4>();
    let (cb, rb) = vb.as_chunks::<4>();
    for (a, b) in ca.iter().zip(cb) {
        for i in 0..4 {
            let d = a[i] - b[i];
            acc[i] += d * d;
        }
    }
    let mut sum = acc[0] + acc[1] + acc[2] + acc[3];
    for (a, b) in ra.iter().zip(rb) {
        let d = a - b;
        sum += d * d;
    }
    sum
}

/// 计算两个等长向量的 L2 距离
#[inline(always)]
pub fn l2(va: &[f32], vb: &[f32]) -> f32 {
    l2_squared(va, vb).sqrt()
}

#[inline(always)]
pub fn l2_naive(va: &[f32], vb: &[f32]) -> f32 {
    va.iter().zip(vb).map(|(a, b)| (a - b) * (a - b)).sum::<f32>().sqrt()
}

/// 向量的 L2 范数
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_identical() {
        let v = [0.3f32, -1.2, 7.5, 1e-3, 42.0];
        assert_eq!(l2(&v, &v), 0.0);
    }

    #[test]
    fn test_l2_pythagoras() {
        assert_eq!(l2(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(l2(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_l2_matches_naive() {
        let va: Vec<f32> = (0..37).map(|i| (i as f32 * 0.37).sin()).collect();
        let vb: Vec<f32> = (0..37).map(|i| (i as f32 * 0.11).cos()).collect();
        assert!((l2(&va, &vb) - l2_naive(&va, &vb)).abs() < 1e-5);
    }

    #[test]
    fn test_l2_empty() {
        assert_eq!(l2(&[], &[]), 0.0);
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
    }
}
