//! 前缀树实现，用于按词边界匹配别名
//!
//! 键和待匹配文本都是标准化之后的形式（词之间只有单个空格），
//! 因此词边界就是空格或文本首尾。

use std::collections::HashMap;

/// 前缀树节点
#[derive(Debug)]
pub struct TrieNode<T> {
    /// 子节点映射（字符 -> 子节点）
    children: HashMap<char, TrieNode<T>>,
    /// 完整词结尾处的关联数据
    value: Option<T>,
}

impl<T> Default for TrieNode<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }
}

/// 别名前缀树
#[derive(Debug)]
pub struct Trie<T> {
    root: TrieNode<T>,
    len: usize,
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self {
            root: TrieNode::default(),
            len: 0,
        }
    }
}

impl<T> Trie<T> {
    /// 创建空的前缀树
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一个词及其关联数据，返回被替换的旧值
    pub fn insert(&mut self, word: &str, value: T) -> Option<T> {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        let previous = node.value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// 查找精确匹配
    pub fn get(&self, word: &str) -> Option<&T> {
        let mut node = &self.root;
        for ch in word.chars() {
            node = node.children.get(&ch)?;
        }
        node.value.as_ref()
    }

    /// 已插入的词数
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 从文本开头查找在词边界结束的最长匹配
    ///
    /// 返回 (匹配的词, 关联数据)
    pub fn find_longest_word_prefix<'a>(&self, text: &'a str) -> Option<(&'a str, &T)> {
        let mut node = &self.root;
        let mut last_match: Option<(&'a str, &T)> = None;
        let mut current_len = 0;

        for ch in text.chars() {
            match node.children.get(&ch) {
                Some(n) => {
                    node = n;
                    current_len += ch.len_utf8();
                    let at_boundary = text[current_len..].is_empty() || text[current_len..].starts_with(' ');
                    if at_boundary {
                        if let Some(ref value) = node.value {
                            last_match = Some((&text[..current_len], value));
                        }
                    }
                }
                None => break,
            }
        }

        last_match
    }

    /// 查找文本中所有按词对齐的匹配（每个词起点取最长的一个）
    ///
    /// 返回 Vec<(起始位置, 匹配词, 关联数据)>
    pub fn find_all_words<'a>(&self, text: &'a str) -> Vec<(usize, &'a str, &T)> {
        let word_starts = std::iter::once(0).chain(text.match_indices(' ').map(|(i, _)| i + 1));

        word_starts
            .filter(|&start| start < text.len())
            .filter_map(|start| {
                self.find_longest_word_prefix(&text[start..])
                    .map(|(matched, value)| (start, matched, value))
            })
            .collect()
    }
}
