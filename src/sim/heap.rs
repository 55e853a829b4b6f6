//! 最小时间堆
//!
//! 按 key（时间）排序的二叉最小堆。除了常规的 push/pop/peek 之外，
//! 还支持“根空洞”：`take_root` 取走堆顶但保留根槽位，随后可以用
//! `fill_root` 把新元素直接写回根并下沉（即根上的 increase-key），
//! 或用 `close_hole` 按普通 pop 的方式补齐。
//!
//! 相同 key 的元素之间顺序不做保证。

/// 堆槽位。只有处于空洞状态的根槽位 `value` 为 `None`。
#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: Option<V>,
}

/// 按 key 升序出队的二叉最小堆。
#[derive(Debug)]
pub struct TimeHeap<K, V> {
    slots: Vec<Slot<K, V>>,
    /// 根槽位是否为空洞。空洞保留被取走元素的 key，该 key 不大于其余所有 key。
    hole: bool,
}

impl<K, V> Default for TimeHeap<K, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            hole: false,
        }
    }
}

impl<K: Ord + Copy, V> TimeHeap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 有效元素个数（不含空洞）
    pub fn len(&self) -> usize {
        self.slots.len() - usize::from(self.hole)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空堆（包括空洞）
    pub fn clear(&mut self) {
        self.slots.clear();
        self.hole = false;
    }

    /// 最小 key。存在空洞时返回根的较小子节点。
    pub fn peek_key(&self) -> Option<K> {
        if !self.hole {
            return self.slots.first().map(|s| s.key);
        }
        match (self.slots.get(1), self.slots.get(2)) {
            (Some(l), Some(r)) => Some(l.key.min(r.key)),
            (Some(l), None) => Some(l.key),
            _ => None,
        }
    }

    pub fn push(&mut self, key: K, value: V) {
        if self.hole && self.slots.first().is_some_and(|root| key < root.key) {
            self.close_hole();
        }
        self.slots.push(Slot {
            key,
            value: Some(value),
        });
        self.sift_up(self.slots.len() - 1);
    }

    /// 弹出最小元素
    pub fn pop(&mut self) -> Option<(K, V)> {
        self.close_hole();
        if self.slots.is_empty() {
            return None;
        }
        let top = self.slots.swap_remove(0);
        self.sift_down(0);
        top.value.map(|v| (top.key, v))
    }

    /// 取走最小元素并在根上留下空洞。
    pub fn take_root(&mut self) -> Option<(K, V)> {
        self.close_hole();
        let root = self.slots.first_mut()?;
        let value = root.value.take()?;
        self.hole = true;
        Some((root.key, value))
    }

    /// 把元素写入根空洞并下沉；没有空洞时等价于 `push`。
    pub fn fill_root(&mut self, key: K, value: V) {
        if !self.hole {
            self.push(key, value);
            return;
        }
        self.hole = false;
        if let Some(root) = self.slots.first_mut() {
            *root = Slot {
                key,
                value: Some(value),
            };
        }
        self.sift_down(0);
    }

    /// 用最后一个槽位补齐根空洞（无空洞时不做任何事）。
    pub fn close_hole(&mut self) {
        if !self.hole {
            return;
        }
        self.hole = false;
        let Some(last) = self.slots.pop() else {
            return;
        };
        // 空洞本身就是最后一个槽位
        if self.slots.is_empty() {
            return;
        }
        self.slots[0] = last;
        self.sift_down(0);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.slots[i].key < self.slots[parent].key {
                self.slots.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.slots.len();
        loop {
            let l = 2 * i + 1;
            let r = l + 1;
            let mut smallest = i;
            if l < n && self.slots[l].key < self.slots[smallest].key {
                smallest = l;
            }
            if r < n && self.slots[r].key < self.slots[smallest].key {
                smallest = r;
            }
            if smallest == i {
                break;
            }
            self.slots.swap(i, smallest);
            i = smallest;
        }
    }
}
