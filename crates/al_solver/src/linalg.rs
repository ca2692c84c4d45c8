// crates/al_solver/src/linalg.rs

//! 稠密线性代数
//!
//! 影响系数矩阵规模通常在数百到数千阶，稠密 LU 分解（部分主元）
//! 足够且可预测。本模块充当规格中"外部线性代数依赖"的占位实现：
//! 求解层只依赖 `factorize` / `solve` 两个入口，替换为外部求解器
//! 时接口不变。
//!
//! 分解一次、多右端项复用：一个任务的多个工况共享同一几何时，
//! 只有右端项随工况变化。

use thiserror::Error;

/// 线性代数错误
#[derive(Debug, Error)]
pub enum LinalgError {
    /// 矩阵奇异或接近奇异
    #[error("矩阵奇异或接近奇异 (主元 {pivot:.3e} @ 第{row}行)")]
    Singular {
        /// 主元所在行
        row: usize,
        /// 主元大小
        pivot: f64,
    },
    /// 维度不匹配
    #[error("维度不匹配: 期望 {expected}, 实际 {got}")]
    DimensionMismatch {
        /// 期望维度
        expected: usize,
        /// 实际维度
        got: usize,
    },
}

/// 奇异判定阈值
const PIVOT_EPS: f64 = 1e-30;

/// 行主序稠密方阵
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// 创建 n×n 零矩阵
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// 矩阵阶数
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// 读元素
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// 写元素
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    /// 第 i 行的可变切片（并行装配按行分发）
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.n..(i + 1) * self.n]
    }

    /// 按行互斥切分（rayon 并行装配用）
    pub fn par_rows_mut<'a>(
        &'a mut self,
    ) -> impl rayon::iter::IndexedParallelIterator<Item = &'a mut [f64]> + 'a {
        use rayon::prelude::*;
        self.data.par_chunks_mut(self.n)
    }
}

/// LU 分解结果
///
/// L 为单位下三角（存对角线下方），U 存对角线及上方，主元置换另存。
#[derive(Debug, Clone)]
pub struct LuFactorization {
    lu: DenseMatrix,
    pivots: Vec<usize>,
}

impl LuFactorization {
    /// 矩阵阶数
    pub fn n(&self) -> usize {
        self.lu.n
    }

    /// 用预分解求解 Ax = b
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, LinalgError> {
        let n = self.lu.n;
        if b.len() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }

        let mut x = b.to_vec();

        // 施加行置换
        for i in 0..n {
            let p = self.pivots[i];
            if p != i {
                x.swap(i, p);
            }
        }

        // 前代: Ly = Pb
        for i in 0..n {
            for j in 0..i {
                x[i] -= self.lu.get(i, j) * x[j];
            }
        }

        // 回代: Ux = y
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                x[i] -= self.lu.get(i, j) * x[j];
            }
            let u_ii = self.lu.get(i, i);
            if u_ii.abs() < PIVOT_EPS {
                return Err(LinalgError::Singular {
                    row: i,
                    pivot: u_ii,
                });
            }
            x[i] /= u_ii;
        }

        Ok(x)
    }
}

/// 部分主元 LU 分解
pub fn lu_factorize(a: &DenseMatrix) -> Result<LuFactorization, LinalgError> {
    let n = a.n;
    let mut lu = a.clone();
    let mut pivots: Vec<usize> = (0..n).collect();

    for k in 0..n {
        // 选列主元
        let mut max_val = lu.get(k, k).abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = lu.get(i, k).abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if max_val < PIVOT_EPS {
            return Err(LinalgError::Singular {
                row: k,
                pivot: max_val,
            });
        }

        if max_row != k {
            for j in 0..n {
                let tmp = lu.get(k, j);
                lu.set(k, j, lu.get(max_row, j));
                lu.set(max_row, j, tmp);
            }
            pivots.swap(k, max_row);
        }

        let inv_pivot = 1.0 / lu.get(k, k);
        for i in (k + 1)..n {
            let factor = lu.get(i, k) * inv_pivot;
            lu.set(i, k, factor);
            for j in (k + 1)..n {
                let v = lu.get(i, j) - factor * lu.get(k, j);
                lu.set(i, j, v);
            }
        }
    }

    Ok(LuFactorization { lu, pivots })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_solve() {
        let mut a = DenseMatrix::zeros(3);
        for i in 0..3 {
            a.set(i, i, 1.0);
        }
        let f = lu_factorize(&a).unwrap();
        let x = f.solve(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_general_solve() {
        // 需要行交换的 3×3 系统
        let mut a = DenseMatrix::zeros(3);
        let rows = [[0.0, 2.0, 1.0], [1.0, 1.0, 1.0], [2.0, 0.0, -1.0]];
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                a.set(i, j, v);
            }
        }
        let f = lu_factorize(&a).unwrap();
        // 解 [1, 1, 1]: b = A·x
        let b = [3.0, 3.0, 1.0];
        let x = f.solve(&b).unwrap();
        for xi in &x {
            assert!((xi - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_singular_detected() {
        let mut a = DenseMatrix::zeros(2);
        a.set(0, 0, 1.0);
        a.set(0, 1, 2.0);
        a.set(1, 0, 2.0);
        a.set(1, 1, 4.0);
        assert!(matches!(
            lu_factorize(&a),
            Err(LinalgError::Singular { .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut a = DenseMatrix::zeros(2);
        a.set(0, 0, 1.0);
        a.set(1, 1, 1.0);
        let f = lu_factorize(&a).unwrap();
        assert!(matches!(
            f.solve(&[1.0]),
            Err(LinalgError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_multiple_rhs_reuse() {
        let mut a = DenseMatrix::zeros(2);
        a.set(0, 0, 2.0);
        a.set(1, 1, 4.0);
        let f = lu_factorize(&a).unwrap();
        assert_eq!(f.solve(&[2.0, 4.0]).unwrap(), vec![1.0, 1.0]);
        assert_eq!(f.solve(&[4.0, 8.0]).unwrap(), vec![2.0, 2.0]);
    }
}
